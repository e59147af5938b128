use crate::parser::{ArrayRecord, ControllerRecord, DriveRecord, Record, SMART_ARRAY_TYPE_KEY};
use crate::status::{status_from_text, temperature_status, Status};
use crate::thresholds::ThresholdSet;

const DEFAULT_VALUE: &str = "n/a";
const INDENT_UNIT: &str = "   ";

fn indent(depth: usize) -> String {
    INDENT_UNIT.repeat(depth)
}

fn attr<'a>(record: &'a Record, key: &str) -> &'a str {
    record.get(key).unwrap_or(DEFAULT_VALUE)
}

#[derive(Debug, Clone)]
pub struct Controller {
    details: Record,
    thresholds: ThresholdSet,
    arrays: Vec<Array>,
    unassigned: Vec<PhysicalDrive>,
}

impl Controller {
    pub fn from_record(record: &ControllerRecord, thresholds: ThresholdSet) -> Self {
        Self {
            details: record.attrs.clone(),
            thresholds,
            arrays: record.arrays.iter().map(Array::from_record).collect(),
            unassigned: record
                .unassigned
                .iter()
                .map(|attrs| PhysicalDrive::from_attrs(attrs))
                .collect(),
        }
    }

    fn cache_board_present(&self) -> bool {
        !self
            .details
            .get("Cache Board Present")
            .unwrap_or("false")
            .eq_ignore_ascii_case("false")
    }

    pub fn check_controller(&self) -> Status {
        status_from_text(self.details.get("Controller Status"), &[])
    }

    pub fn check_controller_temperature(&self) -> Status {
        temperature_status(
            "Controller Temperature (C)",
            self.details.get_int("Controller Temperature (C)"),
            self.thresholds.max_temperature("Controller Maximum Temperature (C)"),
        )
    }

    pub fn check_cache(&self) -> Status {
        if !self.cache_board_present() {
            return Status::Ok;
        }
        status_from_text(self.details.get("Cache Status"), &["temporarily disabled"])
    }

    pub fn check_cache_temperature(&self) -> Status {
        if !self.cache_board_present() {
            return Status::Ok;
        }
        temperature_status(
            "Cache Module Temperature (C)",
            self.details.get_int("Cache Module Temperature (C)"),
            self.thresholds.max_temperature("Cache Module Maximum Temperature (C)"),
        )
    }

    pub fn check_battery_capacitor(&self) -> Status {
        status_from_text(self.details.get("Battery/Capacitor Status"), &["recharging"])
    }

    // ssacli reports the backup power source in the plural ("Capacitors");
    // the matching sensor and threshold names drop the final character.
    fn backup_power_source(&self) -> String {
        let raw = self
            .details
            .get("Cache Backup Power Source")
            .unwrap_or("n/a ");
        let mut chars = raw.chars();
        chars.next_back();
        chars.as_str().to_string()
    }

    pub fn check_battery_capacitor_temperature(&self) -> Status {
        if !self.cache_board_present() {
            return Status::Ok;
        }
        let source = self.backup_power_source();
        // The measured key carries the vendor's double space before "(C)".
        let current = self.details.get_int(&format!("{source} Temperature  (C)"));
        let max = self
            .thresholds
            .max_temperature(&format!("{source} Maximum Temperature (C)"));
        temperature_status(&source, current, max)
    }

    fn is_controller_ok(&self, depth: usize) -> (Status, String) {
        let temp = self.check_controller_temperature();
        let status = self.check_controller().max(temp);
        let line = format!(
            "{}{} - {}",
            indent(depth),
            status.name(),
            self.controller_description(0, Some(temp))
        );
        (status, line)
    }

    fn controller_description(&self, depth: usize, temperature: Option<Status>) -> String {
        let temp = temperature.unwrap_or_else(|| self.check_controller_temperature());
        format!(
            "{}Controller Status: (SN: {}, Temp: {}, {})",
            indent(depth),
            attr(&self.details, "Serial Number"),
            temp.name(),
            attr(&self.details, "Controller Status"),
        )
    }

    fn is_cache_ok(&self, depth: usize) -> (Status, String) {
        if !self.cache_board_present() {
            return (Status::Ok, String::new());
        }
        let temp = self.check_cache_temperature();
        let status = self.check_cache().max(temp);
        let line = format!(
            "{}{} - {}",
            indent(depth),
            status.name(),
            self.cache_description(0, Some(temp))
        );
        (status, line)
    }

    fn cache_description(&self, depth: usize, temperature: Option<Status>) -> String {
        if !self.cache_board_present() {
            return String::new();
        }
        let temp = temperature.unwrap_or_else(|| self.check_cache_temperature());
        format!(
            "{}Cache Status: (SN: {}, Temp: {}, {} GB, {})",
            indent(depth),
            attr(&self.details, "Cache Serial Number"),
            temp.name(),
            attr(&self.details, "Total Cache Size"),
            attr(&self.details, "Cache Status"),
        )
    }

    fn is_battery_capacitor_ok(&self, depth: usize) -> (Status, String) {
        if !self.cache_board_present() {
            return (Status::Ok, String::new());
        }
        let temp = self.check_battery_capacitor_temperature();
        let status = self.check_battery_capacitor().max(temp);
        let line = format!(
            "{}{} - {}",
            indent(depth),
            status.name(),
            self.battery_capacitor_description(0, Some(temp))
        );
        (status, line)
    }

    fn battery_capacitor_description(&self, depth: usize, temperature: Option<Status>) -> String {
        if !self.cache_board_present() {
            return String::new();
        }
        let temp = temperature.unwrap_or_else(|| self.check_battery_capacitor_temperature());
        format!(
            "{}Battery/Capacitor Status: (Temp: {}, Source: {}, {})",
            indent(depth),
            temp.name(),
            self.backup_power_source(),
            attr(&self.details, "Battery/Capacitor Status"),
        )
    }

    fn describe(&self, depth: usize) -> String {
        format!(
            "{}{} in Slot {}: (Host SN: {})",
            indent(depth),
            attr(&self.details, SMART_ARRAY_TYPE_KEY),
            attr(&self.details, "Slot"),
            attr(&self.details, "Host Serial Number"),
        )
    }

    pub fn is_ok(&self, depth: usize) -> (Status, String) {
        let mut description = self.describe(depth);
        let (mut status, controller_line) = self.is_controller_ok(depth + 1);
        description.push('\n');
        description.push_str(&controller_line);
        let (cache_status, cache_line) = self.is_cache_ok(depth + 1);
        if !cache_line.is_empty() {
            status = status.max(cache_status);
            description.push('\n');
            description.push_str(&cache_line);
        }
        let (bc_status, bc_line) = self.is_battery_capacitor_ok(depth + 1);
        if !bc_line.is_empty() {
            status = status.max(bc_status);
            description.push('\n');
            description.push_str(&bc_line);
        }
        for drive in &self.unassigned {
            let (drive_status, drive_line) = drive.is_ok(depth + 1);
            status = status.max(drive_status);
            description.push_str("\nUnassigned:\n");
            description.push_str(&drive_line);
        }
        for array in &self.arrays {
            let (array_status, array_lines) = array.is_ok(depth + 1);
            status = status.max(array_status);
            description.push('\n');
            description.push_str(&array_lines);
        }
        (status, description)
    }

    pub fn simple_description(&self, depth: usize) -> String {
        let mut description = self.describe(depth);
        description.push('\n');
        description.push_str(&self.controller_description(depth + 1, None));
        let cache = self.cache_description(depth + 1, None);
        if !cache.is_empty() {
            description.push('\n');
            description.push_str(&cache);
        }
        let battery = self.battery_capacitor_description(depth + 1, None);
        if !battery.is_empty() {
            description.push('\n');
            description.push_str(&battery);
        }
        for drive in &self.unassigned {
            description.push_str("\nUnassigned:\n");
            description.push_str(&drive.simple_description(depth + 1));
        }
        for array in &self.arrays {
            description.push('\n');
            description.push_str(&array.simple_description(depth + 1));
        }
        description
    }
}

#[derive(Debug, Clone)]
pub struct Array {
    details: Record,
    logical_drives: Vec<LogicalDrive>,
    physical_drives: Vec<PhysicalDrive>,
}

impl Array {
    pub fn from_record(record: &ArrayRecord) -> Self {
        Self {
            details: record.attrs.clone(),
            logical_drives: record.logical_drives.iter().map(LogicalDrive::from_record).collect(),
            physical_drives: record
                .physical_drives
                .iter()
                .map(PhysicalDrive::from_record)
                .collect(),
        }
    }

    pub fn check_status(&self) -> Status {
        status_from_text(self.details.get("Status"), &[])
    }

    fn describe(&self, depth: usize) -> String {
        let unused = attr(&self.details, "Unused Space");
        let unused = unused.split_once(" (").map_or(unused, |(space, _)| space);
        format!(
            "{}Array {} ({}, Unused Space: {}, {})",
            indent(depth),
            attr(&self.details, "Array"),
            attr(&self.details, "Interface Type"),
            unused,
            attr(&self.details, "Status"),
        )
    }

    pub fn is_ok(&self, depth: usize) -> (Status, String) {
        let mut status = self.check_status();
        let mut description = format!("{}{} - {}", indent(depth), status.name(), self.describe(0));
        for drive in &self.logical_drives {
            let (drive_status, drive_line) = drive.is_ok(depth + 1);
            status = status.max(drive_status);
            description.push('\n');
            description.push_str(&drive_line);
        }
        for drive in &self.physical_drives {
            let (drive_status, drive_line) = drive.is_ok(depth + 1);
            status = status.max(drive_status);
            description.push('\n');
            description.push_str(&drive_line);
        }
        (status, description)
    }

    pub fn simple_description(&self, depth: usize) -> String {
        let mut description = self.describe(depth);
        for drive in &self.logical_drives {
            description.push('\n');
            description.push_str(&drive.simple_description(depth + 1));
        }
        for drive in &self.physical_drives {
            description.push('\n');
            description.push_str(&drive.simple_description(depth + 1));
        }
        description
    }
}

#[derive(Debug, Clone)]
pub struct LogicalDrive {
    details: Record,
}

impl LogicalDrive {
    pub fn from_record(record: &DriveRecord) -> Self {
        Self {
            details: record.attrs.clone(),
        }
    }

    pub fn check_status(&self) -> Status {
        status_from_text(
            self.details.get("Status"),
            &["recovering", "transforming", "waiting"],
        )
    }

    pub fn is_ok(&self, depth: usize) -> (Status, String) {
        let status = self.check_status();
        let line = format!(
            "{}{} - {}",
            indent(depth),
            status.name(),
            self.simple_description(0)
        );
        (status, line)
    }

    pub fn simple_description(&self, depth: usize) -> String {
        format!(
            "{}Logical Drive: {} ({}, {}, RAID {}, {})",
            indent(depth),
            attr(&self.details, "Logical Drive"),
            attr(&self.details, "Disk Name"),
            attr(&self.details, "Size"),
            attr(&self.details, "Fault Tolerance"),
            attr(&self.details, "Status"),
        )
    }
}

#[derive(Debug, Clone)]
pub struct PhysicalDrive {
    details: Record,
}

impl PhysicalDrive {
    pub fn from_record(record: &DriveRecord) -> Self {
        Self {
            details: record.attrs.clone(),
        }
    }

    pub fn from_attrs(attrs: &Record) -> Self {
        Self {
            details: attrs.clone(),
        }
    }

    pub fn check_status(&self) -> Status {
        status_from_text(
            self.details.get("Status"),
            &["rebuilding", "predictive failure"],
        )
    }

    pub fn check_temperature(&self) -> Status {
        temperature_status(
            "Current Temperature (C)",
            self.details.get_int("Current Temperature (C)"),
            self.details.get_int("Maximum Temperature (C)"),
        )
    }

    fn drive_type(&self) -> String {
        let raw = attr(&self.details, "Interface Type");
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("solid state ") {
            format!("{} SSD", &raw["solid state ".len()..])
        } else if lower.starts_with("ssd") {
            let kept: String = raw.chars().take(raw.chars().count() - 3).collect();
            format!("{kept} SSD")
        } else if raw != DEFAULT_VALUE {
            format!("{raw} HDD")
        } else {
            raw.to_string()
        }
    }

    pub fn is_ok(&self, depth: usize) -> (Status, String) {
        let temp = self.check_temperature();
        let status = self.check_status().max(temp);
        let line = format!(
            "{}{} - {}",
            indent(depth),
            status.name(),
            self.describe(0, Some(temp))
        );
        (status, line)
    }

    pub fn simple_description(&self, depth: usize) -> String {
        self.describe(depth, None)
    }

    fn describe(&self, depth: usize, temperature: Option<Status>) -> String {
        let temp = temperature.unwrap_or_else(|| self.check_temperature());
        format!(
            "{}Physical Drive: {} (SN: {}, Temp: {}, port {}:box {}:bay {}, {}, {}, {})",
            indent(depth),
            attr(&self.details, "Physical Drive"),
            attr(&self.details, "Serial Number"),
            temp.name(),
            attr(&self.details, "Port"),
            attr(&self.details, "Box"),
            attr(&self.details, "Bay"),
            self.drive_type(),
            attr(&self.details, "Size"),
            attr(&self.details, "Status"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn record(pairs: &[(&str, &str)]) -> Record {
        let mut record = Record::default();
        for (key, value) in pairs {
            record.insert(*key, *value);
        }
        record
    }

    fn drive_record(pairs: &[(&str, &str)]) -> DriveRecord {
        DriveRecord {
            attrs: record(pairs),
            partitions: None,
        }
    }

    fn controller_from(raw: &str, thresholds: ThresholdSet) -> Controller {
        let records = parser::parse(raw).expect("test input must parse");
        Controller::from_record(&records[0], thresholds)
    }

    fn thresholds(pairs: &[(&str, i64)]) -> ThresholdSet {
        ThresholdSet::from_maxima(
            pairs
                .iter()
                .map(|(key, value)| ((*key).to_string(), serde_yaml::Value::from(*value)))
                .collect(),
        )
    }

    #[test]
    fn physical_drive_status_vocabulary() {
        let ok = PhysicalDrive::from_attrs(&record(&[("Status", "OK")]));
        assert_eq!(ok.check_status(), Status::Ok);
        let rebuilding = PhysicalDrive::from_attrs(&record(&[("Status", "Rebuilding")]));
        assert_eq!(rebuilding.check_status(), Status::Warning);
        let predictive = PhysicalDrive::from_attrs(&record(&[("Status", "Predictive Failure")]));
        assert_eq!(predictive.check_status(), Status::Warning);
        let failed = PhysicalDrive::from_attrs(&record(&[("Status", "Failed")]));
        assert_eq!(failed.check_status(), Status::Critical);
        let odd = PhysicalDrive::from_attrs(&record(&[("Status", "Erasing")]));
        assert_eq!(odd.check_status(), Status::Unknown);
        let missing = PhysicalDrive::from_attrs(&record(&[]));
        assert_eq!(missing.check_status(), Status::Unknown);
    }

    #[test]
    fn physical_drive_temperature_uses_its_own_maximum() {
        let drive = PhysicalDrive::from_attrs(&record(&[
            ("Current Temperature (C)", "39"),
            ("Maximum Temperature (C)", "40"),
        ]));
        assert_eq!(drive.check_temperature(), Status::Warning);
        let no_max = PhysicalDrive::from_attrs(&record(&[("Current Temperature (C)", "39")]));
        assert_eq!(no_max.check_temperature(), Status::Unknown);
    }

    #[test]
    fn physical_drive_description_rewrites_interface_type() {
        let sas = PhysicalDrive::from_attrs(&record(&[("Interface Type", "SAS")]));
        assert!(sas.simple_description(0).contains("SAS HDD"));
        let solid = PhysicalDrive::from_attrs(&record(&[(
            "Interface Type",
            "Solid State SATA",
        )]));
        assert!(solid.simple_description(0).contains("SATA SSD"));
        let missing = PhysicalDrive::from_attrs(&record(&[]));
        assert!(missing.simple_description(0).contains("n/a,"));
    }

    #[test]
    fn logical_drive_warning_vocabulary() {
        for text in ["Recovering", "Transforming", "Waiting for rebuild"] {
            let drive = LogicalDrive::from_record(&drive_record(&[("Status", text)]));
            assert_eq!(drive.check_status(), Status::Warning, "{text}");
        }
        let drive = LogicalDrive::from_record(&drive_record(&[("Status", "Rebuilding")]));
        assert_eq!(drive.check_status(), Status::Unknown);
    }

    #[test]
    fn failed_array_dominates_healthy_drives() {
        let raw = "\
Smart Array P420i in Slot 0
   Controller Status: OK
   Array: A
      Status: Failed
      Logical Drive: 1
         Status: OK
      physicaldrive 1I:1:1
         Status: OK
         Current Temperature (C): 35
         Maximum Temperature (C): 40
";
        let controller = controller_from(raw, ThresholdSet::default());
        let array = &controller.arrays[0];
        let (status, description) = array.is_ok(0);
        assert_eq!(status, Status::Critical);
        assert!(description.starts_with("Critical - Array A"));
    }

    #[test]
    fn absent_cache_board_reports_ok_and_omits_lines() {
        let raw = "\
Smart Array P420i in Slot 0
   Slot: 0
   Serial Number: SN1
   Host Serial Number: HSN1
   Controller Status: OK
   Cache Board Present: False
";
        let controller = controller_from(raw, ThresholdSet::default());
        assert_eq!(controller.check_cache(), Status::Ok);
        assert_eq!(controller.check_cache_temperature(), Status::Ok);
        assert_eq!(controller.check_battery_capacitor_temperature(), Status::Ok);
        let (_, report) = controller.is_ok(0);
        assert!(!report.contains("Cache Status"));
        assert!(!report.contains("Battery/Capacitor"));
        let simple = controller.simple_description(0);
        assert!(!simple.contains("Cache Status"));
        assert!(!simple.contains("Battery/Capacitor"));
    }

    #[test]
    fn cache_status_vocabulary() {
        let base = "\
Smart Array P420i in Slot 0
   Cache Board Present: True
   Cache Status: ";
        for (text, expected) in [
            ("OK", Status::Ok),
            ("Temporarily Disabled", Status::Warning),
            ("Failed", Status::Critical),
            ("Obscure", Status::Unknown),
        ] {
            let controller =
                controller_from(&format!("{base}{text}\n"), ThresholdSet::default());
            assert_eq!(controller.check_cache(), expected, "{text}");
        }
    }

    #[test]
    fn battery_sensor_name_comes_from_the_power_source() {
        let raw = "\
Smart Array P420i in Slot 0
   Cache Board Present: True
   Cache Backup Power Source: Capacitors
   Battery/Capacitor Status: OK
   Capacitor Temperature  (C): 59
";
        let thresholds = thresholds(&[("Capacitor Maximum Temperature (C)", 60)]);
        let controller = controller_from(raw, thresholds);
        assert_eq!(controller.check_battery_capacitor_temperature(), Status::Warning);
        assert_eq!(controller.check_battery_capacitor(), Status::Ok);
        let (status, line) = controller.is_battery_capacitor_ok(0);
        assert_eq!(status, Status::Warning);
        assert!(line.contains("Source: Capacitor,"));
    }

    #[test]
    fn battery_recharging_is_a_warning() {
        let raw = "\
Smart Array P420i in Slot 0
   Cache Board Present: True
   Battery/Capacitor Status: Recharging
";
        let controller = controller_from(raw, ThresholdSet::default());
        assert_eq!(controller.check_battery_capacitor(), Status::Warning);
    }

    #[test]
    fn controller_temperature_without_thresholds_is_unknown() {
        let raw = "\
Smart Array P420i in Slot 0
   Controller Status: OK
   Controller Temperature (C): 50
";
        let controller = controller_from(raw, ThresholdSet::default());
        assert_eq!(controller.check_controller_temperature(), Status::Unknown);
    }

    #[test]
    fn controller_temperature_boundaries_against_thresholds() {
        let raw = "\
Smart Array P420i in Slot 0
   Controller Status: OK
   Controller Temperature (C): 89
";
        let thresholds = thresholds(&[("Controller Maximum Temperature (C)", 90)]);
        let controller = controller_from(raw, thresholds);
        assert_eq!(controller.check_controller_temperature(), Status::Warning);
    }

    #[test]
    fn simple_description_keeps_identifying_attributes() {
        let raw = "\
Smart Array P420i in Slot 0 (Embedded)
   Slot: 0
   Serial Number: PDSXK0BRH6VZ3K
   Host Serial Number: CZJ1234567
   Controller Status: OK
   Array: A
      Interface Type: SAS
      Unused Space: 0  MB (0.0%)
      Status: OK
      Logical Drive: 1
         Disk Name: /dev/sda
         Size: 279.4 GB
         Fault Tolerance: 1
         Status: OK
      physicaldrive 1I:1:1
         Port: 1I
         Box: 1
         Bay: 1
         Serial Number: XXABC123
         Interface Type: SAS
         Size: 300 GB
         Status: OK
";
        let controller = controller_from(raw, ThresholdSet::default());
        let simple = controller.simple_description(0);
        assert!(simple.starts_with("Smart Array P420i in Slot 0: (Host SN: CZJ1234567)"));
        assert!(simple.contains("SN: PDSXK0BRH6VZ3K"));
        assert!(simple.contains("Array A (SAS, Unused Space: 0  MB, OK)"));
        assert!(simple.contains("Logical Drive: 1 (/dev/sda, 279.4 GB, RAID 1, OK)"));
        assert!(simple.contains("Physical Drive: 1I:1:1 (SN: XXABC123"));
        assert!(simple.contains("port 1I:box 1:bay 1"));
    }

    #[test]
    fn report_lines_are_indented_by_depth() {
        let raw = "\
Smart Array P420i in Slot 0
   Controller Status: OK
   Array: A
      Status: OK
      Logical Drive: 1
         Status: OK
";
        let controller = controller_from(raw, ThresholdSet::default());
        let (_, report) = controller.is_ok(0);
        let lines: Vec<&str> = report.lines().collect();
        assert!(lines[0].starts_with("Smart Array"));
        assert!(lines[1].starts_with("   "));
        assert!(lines[2].starts_with("   ") && !lines[2].starts_with("      "));
        assert!(lines[3].starts_with("      "));
    }
}
