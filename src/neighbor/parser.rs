use super::*;

/// Shape of a trimmed line inside a neighbor block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    IpAddress,
    PlatformCapabilities,
    Interface,
    ManagementHeader,
    Boundary,
    DeviceId,
}

/// Substring marking the end of a neighbor block.
const BOUNDARY_TOKEN: &str = "---";

fn compile(name: &str, pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(err) => panic!("invalid {name} regex: {err}"),
    }
}

static DEVICE_ID: Lazy<Regex> = Lazy::new(|| compile("device id", r"^Device ID:(.+)"));

/// Address line probed after a `Management address(es):` header.
static MANAGEMENT_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    compile(
        "management address",
        r"^(?:IP address: (.+)|IPv4 Address: (.+))",
    )
});

/// Line classifiers in priority order. The first pattern that matches a line
/// decides its kind; later patterns are not consulted.
static CLASSIFIERS: Lazy<Vec<(LineKind, Regex)>> = Lazy::new(|| {
    vec![
        (
            LineKind::IpAddress,
            compile("ip address", r"^(?:IPv4 Address: (.+)|IP address: (.+))"),
        ),
        (
            LineKind::PlatformCapabilities,
            compile("platform", r"^Platform: (.+),\s*Capabilities: (.+)"),
        ),
        (
            LineKind::Interface,
            compile(
                "interface",
                r"^(?:Interface: (.+),\s*Port ID \(outgoing port\): (.+)|Interface: (.+),\s*Port ID: (.+))",
            ),
        ),
        (
            LineKind::ManagementHeader,
            compile("management header", r"^Management address\(es\):"),
        ),
        (
            LineKind::Boundary,
            compile("boundary", &regex::escape(BOUNDARY_TOKEN)),
        ),
        (LineKind::DeviceId, Regex::clone(&DEVICE_ID)),
    ]
});

/// Capture groups of each alternation branch, in branch order.
const IP_BRANCHES: &[usize] = &[1, 2];
const INTERFACE_BRANCHES: &[(usize, usize)] = &[(1, 2), (3, 4)];

/// Classifies a trimmed line against the ordered classifier table.
///
/// Returns the kind of the first matching classifier together with its
/// captures, or `None` for a line no classifier recognises.
pub fn classify_line(line: &str) -> Option<(LineKind, Captures<'_>)> {
    CLASSIFIERS
        .iter()
        .find_map(|(kind, re)| re.captures(line).map(|caps| (*kind, caps)))
}

/// Value of the first alternation branch that participated in the match.
///
/// Only one branch of an alternation can accept, so this never mixes groups
/// from different spellings.
fn branch_value<'h>(caps: &Captures<'h>, groups: &[usize]) -> Option<&'h str> {
    groups
        .iter()
        .find_map(|&group| caps.get(group))
        .map(|m| m.as_str().trim())
}

fn branch_pair<'h>(caps: &Captures<'h>, branches: &[(usize, usize)]) -> Option<(&'h str, &'h str)> {
    branches.iter().find_map(|&(first, second)| {
        Some((
            caps.get(first)?.as_str().trim(),
            caps.get(second)?.as_str().trim(),
        ))
    })
}

fn is_record_delimiter(line: &str) -> bool {
    DEVICE_ID.is_match(line) || line.contains(BOUNDARY_TOKEN)
}

/// Parses the output of `show cdp neighbors detail` into neighbor records.
///
/// Never fails. Lines that match no classifier are skipped, so the worst
/// case is a record carrying only its `device_id`, or no records at all for
/// input without a `Device ID:` line. Records come back in the order their
/// `Device ID:` lines appear.
///
/// # Example
///
/// ```
/// use cdpscan::neighbor::parse_neighbors;
///
/// let raw = "Device ID:core-sw01\nIP address: 10.0.0.1\n---\n";
/// let records = parse_neighbors(raw);
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].ip_address.as_deref(), Some("10.0.0.1"));
/// ```
pub fn parse_neighbors(raw: &str) -> Vec<NeighborRecord> {
    let mut parser = NeighborParser::new(raw);
    parser.run();
    parser.records
}

/// Line cursor plus the record currently being filled.
///
/// `current` is `None` while scanning for a record start and `Some` while a
/// record is open.
struct NeighborParser<'a> {
    lines: Vec<&'a str>,
    pos: usize,
    current: Option<NeighborRecord>,
    records: Vec<NeighborRecord>,
}

impl<'a> NeighborParser<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            lines: raw.split('\n').collect(),
            pos: 0,
            current: None,
            records: Vec::new(),
        }
    }

    fn run(&mut self) {
        while let Some(line) = self.next_line() {
            if self.current.is_some() {
                self.fill(line);
            } else if let Some(caps) = DEVICE_ID.captures(line) {
                self.open(&caps);
            }
        }
        // A record still open at end of input is kept.
        self.finalize();
    }

    /// Returns the next line trimmed and advances past it.
    fn next_line(&mut self) -> Option<&'a str> {
        let line: &'a str = *self.lines.get(self.pos)?;
        self.pos += 1;
        Some(line.trim())
    }

    fn open(&mut self, caps: &Captures<'_>) {
        let device_id = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        trace!("Opening neighbor record '{}'", device_id);
        self.current = Some(NeighborRecord::new(device_id));
    }

    fn finalize(&mut self) {
        if let Some(record) = self.current.take() {
            if record.is_bare() {
                debug!(
                    "Neighbor record finalized with no fields: {}",
                    record.device_id
                );
            } else {
                debug!("Neighbor record finalized: {}", record.device_id);
            }
            self.records.push(record);
        }
    }

    fn fill(&mut self, line: &'a str) {
        let Some((kind, caps)) = classify_line(line) else {
            return;
        };
        trace!("Line {} classified as {:?}", self.pos, kind);

        match kind {
            LineKind::IpAddress => {
                if let (Some(value), Some(record)) =
                    (branch_value(&caps, IP_BRANCHES), self.current.as_mut())
                {
                    record.ip_address = Some(value.to_string());
                }
            }
            LineKind::PlatformCapabilities => {
                if let (Some((platform, capabilities)), Some(record)) =
                    (caps.get(1).zip(caps.get(2)), self.current.as_mut())
                {
                    record.set_platform(platform.as_str().trim(), capabilities.as_str().trim());
                }
            }
            LineKind::Interface => {
                if let (Some((interface, port)), Some(record)) =
                    (branch_pair(&caps, INTERFACE_BRANCHES), self.current.as_mut())
                {
                    record.interface = Some(interface.to_string());
                    record.port_id = Some(port.to_string());
                }
            }
            LineKind::ManagementHeader => {
                let address = self.take_management_address();
                if let (Some(address), Some(record)) = (address, self.current.as_mut()) {
                    record.management_address = Some(address);
                }
            }
            LineKind::Boundary => self.finalize(),
            LineKind::DeviceId => {
                self.finalize();
                self.open(&caps);
            }
        }
    }

    /// Scans past blank lines after a management header and probes the next
    /// line for an address.
    ///
    /// The probed line is consumed whether or not it matched, unless it is a
    /// `Device ID:` or boundary line, which stay in place for the main loop.
    fn take_management_address(&mut self) -> Option<String> {
        while self
            .lines
            .get(self.pos)
            .is_some_and(|line| line.trim().is_empty())
        {
            self.pos += 1;
        }

        let line: &'a str = *self.lines.get(self.pos)?;
        let line = line.trim();
        if let Some(caps) = MANAGEMENT_ADDRESS.captures(line) {
            self.pos += 1;
            return branch_value(&caps, IP_BRANCHES).map(str::to_string);
        }
        if !is_record_delimiter(line) {
            self.pos += 1;
        }
        None
    }
}
