use thiserror::Error;

pub const SMART_ARRAY_TYPE_KEY: &str = "Smart Array Type";
pub const PART_INFO_KEY: &str = "Disk Partition Information";
pub const SEP_KEY: &str = "SEP";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("indented line before any controller: {line:?}")]
    OrphanLine { line: String },
    #[error("{key:?} section opened before any Array section")]
    NoOpenArray { key: String },
    #[error("attribute line outside any open section: {line:?}")]
    Misplaced { line: String },
    #[error("partition line before a partition information header: {line:?}")]
    PartitionOutsideTable { line: String },
    #[error("line has no key/value separator: {line:?}")]
    MissingSeparator { line: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, String)>,
}

impl Record {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key)?.trim().parse().ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerRecord {
    pub attrs: Record,
    pub ports: Vec<Record>,
    pub arrays: Vec<ArrayRecord>,
    pub unassigned: Vec<Record>,
    pub sep: Record,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrayRecord {
    pub attrs: Record,
    pub logical_drives: Vec<DriveRecord>,
    pub physical_drives: Vec<DriveRecord>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriveRecord {
    pub attrs: Record,
    pub partitions: Option<Record>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Controller,
    Ports,
    Arrays,
    Unassigned,
    LogicalDrives,
    PhysicalDrives,
    Sep,
}

pub fn parse(raw: &str) -> Result<Vec<ControllerRecord>, ParseError> {
    let mut controllers: Vec<ControllerRecord> = Vec::new();
    let mut cursor = Cursor::Controller;

    for line in raw.lines().filter(|l| !l.trim().is_empty()) {
        // A flush-left line opens a new controller; everything up to the
        // " in " separator is the controller model.
        if !line.starts_with(' ') && !line.starts_with('\t') {
            let model = line.split_once(" in ").map_or(line, |(model, _)| model);
            let mut record = ControllerRecord::default();
            record.attrs.insert(SMART_ARRAY_TYPE_KEY, model.trim_end());
            controllers.push(record);
            cursor = Cursor::Controller;
            continue;
        }
        let controller = controllers.last_mut().ok_or_else(|| ParseError::OrphanLine {
            line: line.trim().to_string(),
        })?;
        cursor = ingest(controller, cursor, line)?;
    }

    Ok(controllers)
}

fn ingest(
    controller: &mut ControllerRecord,
    cursor: Cursor,
    line: &str,
) -> Result<Cursor, ParseError> {
    let (key, value) = split_key_value(line)?;

    match key.as_str() {
        "Port Name" => {
            let mut port = Record::default();
            port.insert("Port Name", value.unwrap_or_default());
            controller.ports.push(port);
            return Ok(Cursor::Ports);
        }
        "Array" => {
            let mut array = ArrayRecord::default();
            array.attrs.insert("Array", value.unwrap_or_default());
            controller.arrays.push(array);
            return Ok(Cursor::Arrays);
        }
        "Unassigned" => {
            let mut drive = Record::default();
            drive.insert("Unassigned", value.unwrap_or_default());
            controller.unassigned.push(drive);
            return Ok(Cursor::Unassigned);
        }
        header @ ("Physical Drive" | "Logical Drive") => {
            let array = controller
                .arrays
                .last_mut()
                .ok_or_else(|| ParseError::NoOpenArray {
                    key: header.to_string(),
                })?;
            let (list, next) = if header == "Physical Drive" {
                (&mut array.physical_drives, Cursor::PhysicalDrives)
            } else {
                (&mut array.logical_drives, Cursor::LogicalDrives)
            };
            let mut drive = DriveRecord::default();
            drive.attrs.insert(header, value.unwrap_or_default());
            list.push(drive);
            return Ok(next);
        }
        SEP_KEY => {
            controller.sep = Record::default();
            return Ok(Cursor::Sep);
        }
        _ => {}
    }

    let misplaced = || ParseError::Misplaced {
        line: line.trim().to_string(),
    };
    match cursor {
        Cursor::Controller => controller.attrs.insert(key, value.unwrap_or_default()),
        Cursor::Ports => {
            let port = controller.ports.last_mut().ok_or_else(misplaced)?;
            port.insert(key, value.unwrap_or_default());
        }
        Cursor::Arrays => {
            let array = controller.arrays.last_mut().ok_or_else(misplaced)?;
            array.attrs.insert(key, value.unwrap_or_default());
        }
        Cursor::Unassigned => {
            let drive = controller.unassigned.last_mut().ok_or_else(misplaced)?;
            drive.insert(key, value.unwrap_or_default());
        }
        Cursor::LogicalDrives | Cursor::PhysicalDrives => {
            let array = controller.arrays.last_mut().ok_or_else(misplaced)?;
            let drive = if cursor == Cursor::PhysicalDrives {
                array.physical_drives.last_mut()
            } else {
                array.logical_drives.last_mut()
            }
            .ok_or_else(misplaced)?;
            if key == PART_INFO_KEY {
                drive.partitions = Some(Record::default());
            } else if key.starts_with("Partition") {
                let partitions =
                    drive
                        .partitions
                        .as_mut()
                        .ok_or_else(|| ParseError::PartitionOutsideTable {
                            line: line.trim().to_string(),
                        })?;
                partitions.insert(key, value.unwrap_or_default());
            } else {
                drive.attrs.insert(key, value.unwrap_or_default());
            }
        }
        Cursor::Sep => controller.sep.insert(key, value.unwrap_or_default()),
    }
    Ok(cursor)
}

fn split_key_value(line: &str) -> Result<(String, Option<String>), ParseError> {
    let line = line.trim();
    // ssacli prints drive headers as "physicaldrive 1I:1:1" with no colon
    // after the key.
    if let Some(rest) = line.strip_prefix("physicaldrive") {
        return Ok(("Physical Drive".to_string(), Some(rest.trim_start().to_string())));
    }
    if line.starts_with(SEP_KEY) {
        return Ok((SEP_KEY.to_string(), None));
    }
    if line == PART_INFO_KEY {
        return Ok((PART_INFO_KEY.to_string(), None));
    }
    let (key, value) = line
        .split_once(':')
        .ok_or_else(|| ParseError::MissingSeparator {
            line: line.to_string(),
        })?;
    Ok((key.trim_end().to_string(), Some(value.trim_start().to_string())))
}
