use crate::core::multirange::MultiRange;
use crate::domain::model::{ReportRow, SecurityGroupFact, Status};
use crate::utils::error::{CheckupError, Result};

pub const DEFAULT_SAFE_PORTS: [u32; 3] = [22, 80, 443];

/// Turns security group facts into report rows.
#[derive(Debug, Clone)]
pub struct Classifier {
    safe_ports: Vec<u32>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Classifier {
    /// `None` falls back to [`DEFAULT_SAFE_PORTS`]; `Some(&[])` treats no port as safe.
    pub fn new(safe_ports: Option<&[u32]>) -> Self {
        Self {
            safe_ports: safe_ports.unwrap_or(&DEFAULT_SAFE_PORTS).to_vec(),
        }
    }

    pub fn safe_ports(&self) -> &[u32] {
        &self.safe_ports
    }

    pub fn classify(&self, fact: &SecurityGroupFact) -> Result<ReportRow> {
        let unsafe_ports = self.unsafe_ports(fact)?;
        Ok(ReportRow {
            arn: fact.arn.clone(),
            name: fact.name.clone(),
            status: status(fact, &unsafe_ports),
            public_ips: fact.public_ips.clone(),
            in_use: fact.in_use,
            is_default: fact.is_default,
            notes: notes(fact, &unsafe_ports),
        })
    }

    /// Ports open to traffic that are not on the safe list. A group without port data
    /// reports no unsafe ports.
    pub fn unsafe_ports(&self, fact: &SecurityGroupFact) -> Result<MultiRange> {
        let Some(spec) = fact.port_range_specs.first() else {
            return Ok(MultiRange::new());
        };
        let mut ports =
            MultiRange::from_string(spec).map_err(|source| CheckupError::PortRangeError {
                group: fact.name.clone(),
                spec: spec.clone(),
                source,
            })?;
        for &port in &self.safe_ports {
            ports.remove_element(port);
        }
        Ok(ports)
    }
}

fn is_problematic(fact: &SecurityGroupFact) -> bool {
    fact.large_range_count || fact.is_large_public_block
}

pub fn status(fact: &SecurityGroupFact, unsafe_ports: &MultiRange) -> Status {
    let no_ips = fact.public_ips.is_empty();
    match (fact.is_default, fact.in_use) {
        (true, true) => {
            if fact.is_restricted || fact.internal_only || no_ips {
                Status::Yellow
            } else {
                Status::Red
            }
        }
        // locked down and unused is the best a default group can be
        (true, false) if fact.is_restricted => Status::Green,
        (true, false) => Status::Yellow,
        (false, true) => {
            if fact.is_restricted || (!is_problematic(fact) && unsafe_ports.size() == 0) {
                Status::Green
            } else if no_ips {
                Status::Yellow
            } else {
                Status::Red
            }
        }
        // a non-default group should not exist unless something uses it
        (false, false) => Status::Yellow,
    }
}

pub fn notes(fact: &SecurityGroupFact, unsafe_ports: &MultiRange) -> Vec<String> {
    let mut notes = Vec::new();
    if unsafe_ports.size() > 0 && !fact.internal_only {
        notes.push(format!(
            "Allows traffic from anywhere on TCP ports ({})",
            unsafe_ports.humanize()
        ));
    }
    if fact.is_large_public_block {
        notes.push("Has IP restrictions, but they let through large ranges".to_string());
    }
    if fact.large_range_count {
        notes.push("Uses a lot of IP Ranges".to_string());
    }
    if !fact.in_use {
        notes.push("Not in use".to_string());
    }
    if fact.public_ips.is_empty() {
        notes.push("No public IP addresses found".to_string());
    } else {
        notes.push(format!(
            "Contains {} public IP address(es)",
            fact.public_ips.len()
        ));
    }
    notes
}
