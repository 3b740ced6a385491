//! Tabular metrics files written by the simulation scripts.
//!
//! Two layouts are supported:
//! - the topology comparison table, one row per topology without a header:
//!   `Topology,PacketLoss(%),Latency(ms),Throughput(Mbps)[,PDR(%)]`
//! - the traffic-flow table, with a header row:
//!   `Flow Type,Throughput (Mbps),Latency (ms),Packet Loss (%)`

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::normalize::normalize_dimension;
use super::types::*;

/// Topology comparison rows, in file order
#[derive(Debug, Clone, PartialEq)]
pub struct TopologyTable {
    pub records: Vec<TopologyRecord>,
}

impl TopologyTable {
    /// True when every row carries a PDR value
    pub fn has_pdr(&self) -> bool {
        !self.records.is_empty() && self.records.iter().all(|r| r.pdr.is_some())
    }

    pub fn labels(&self) -> Vec<String> {
        self.records.iter().map(|r| r.topology.clone()).collect()
    }

    /// Raw values of one metric column; `None` for PDR when the column is absent
    pub fn series(&self, metric: MetricKind) -> Option<Vec<f64>> {
        match metric {
            MetricKind::PacketLoss => Some(self.records.iter().map(|r| r.packet_loss).collect()),
            MetricKind::Latency => Some(self.records.iter().map(|r| r.latency_ms).collect()),
            MetricKind::Throughput => Some(self.records.iter().map(|r| r.throughput_mbps).collect()),
            MetricKind::Pdr => {
                if self.has_pdr() {
                    self.records.iter().map(|r| r.pdr).collect()
                } else {
                    None
                }
            }
        }
    }

    /// Min-max normalized values of one metric column
    pub fn normalized(&self, metric: MetricKind) -> Option<Vec<f64>> {
        self.series(metric).map(|values| normalize_dimension(&values))
    }
}

fn parse_number(field: &str, column: &str, line: u64) -> Result<f64, ParseError> {
    field.parse::<f64>().map_err(|_| ParseError::Table {
        line,
        message: format!("{} is not a number: '{}'", column, field),
    })
}

fn csv_error(e: csv::Error) -> ParseError {
    let line = e.position().map(|p| p.line()).unwrap_or(0);
    ParseError::Table {
        line,
        message: e.to_string(),
    }
}

/// Parse a topology comparison table.
///
/// A leading header row (non-numeric second column) is tolerated and
/// skipped. An empty or missing PDR column yields `pdr: None`.
pub fn parse_topology_table<R: Read>(reader: R) -> Result<TopologyTable, ParseError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (index, row) in csv.records().enumerate() {
        let row = row.map_err(csv_error)?;
        let line = row.position().map(|p| p.line()).unwrap_or(index as u64 + 1);

        if row.len() < 4 {
            return Err(ParseError::Table {
                line,
                message: format!("expected at least 4 columns, found {}", row.len()),
            });
        }
        if index == 0 && row[1].parse::<f64>().is_err() {
            log::debug!("Skipping header row of topology table");
            continue;
        }

        let pdr = match row.get(4) {
            Some(field) if !field.is_empty() => Some(parse_number(field, "PDR(%)", line)?),
            _ => None,
        };

        records.push(TopologyRecord {
            topology: row[0].to_string(),
            packet_loss: parse_number(&row[1], "PacketLoss(%)", line)?,
            latency_ms: parse_number(&row[2], "Latency(ms)", line)?,
            throughput_mbps: parse_number(&row[3], "Throughput(Mbps)", line)?,
            pdr,
        });
    }

    Ok(TopologyTable { records })
}

/// Load a topology comparison table from disk
pub fn load_topology_table(path: &Path) -> Result<TopologyTable, ParseError> {
    let file = File::open(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let table = parse_topology_table(file)?;
    log::info!("Loaded {} topology rows from {}", table.records.len(), path.display());
    Ok(table)
}

/// Parse a traffic-flow table with a header row
pub fn parse_flow_samples<R: Read>(reader: R) -> Result<Vec<FlowSample>, ParseError> {
    let mut csv = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let samples = csv
        .deserialize::<FlowSample>()
        .map(|row| row.map_err(csv_error))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(samples)
}

/// Load a traffic-flow table from disk
pub fn load_flow_samples(path: &Path) -> Result<Vec<FlowSample>, ParseError> {
    let file = File::open(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let samples = parse_flow_samples(file)?;
    log::info!("Loaded {} flow samples from {}", samples.len(), path.display());
    Ok(samples)
}

/// Group flow samples into one series per flow type, in order of first appearance
pub fn group_flow_series(samples: &[FlowSample]) -> Vec<FlowSeries> {
    let mut series: Vec<FlowSeries> = Vec::new();

    for sample in samples {
        let index = match series.iter().position(|s| s.flow_type == sample.flow_type) {
            Some(index) => index,
            None => {
                series.push(FlowSeries {
                    flow_type: sample.flow_type.clone(),
                    throughput_mbps: Vec::new(),
                    latency_ms: Vec::new(),
                    packet_loss: Vec::new(),
                });
                series.len() - 1
            }
        };
        let entry = &mut series[index];
        entry.throughput_mbps.push(sample.throughput_mbps);
        entry.latency_ms.push(sample.latency_ms);
        entry.packet_loss.push(sample.packet_loss);
    }

    series
}

/// Arithmetic mean, 0 for an empty series
pub fn mean(values: &[f64]) -> f64 {
    crate::utils::ratio::safe_ratio(values.iter().sum(), values.len() as f64, 0.0)
}
