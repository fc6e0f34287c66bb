//! Conversion from raw records to domain types.
//!
//! All loose text is normalised here, once. Invalid coordinates become
//! `None`; malformed timetable text is dropped. Only records that cannot be
//! identified or placed are rejected.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{
    Category, Coord, Coverage, Direction, DomainError, Line, LineCode, ServiceWindow, Stop,
    StopCode, Topology, normalize, normalize_opt, parse_hhmm,
};

use super::records::{LineRecord, StopRecord};

/// Conversion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Line codes known to be one-way loops, whatever their records say.
    pub circular_codes: Vec<String>,

    /// Normalised `origen` values that mark a one-way loop.
    pub circular_markers: Vec<String>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            circular_codes: Vec::new(),
            circular_markers: vec!["circulacion".to_string(), "circulation".to_string()],
        }
    }
}

impl RepositoryConfig {
    fn topology(&self, code: &LineCode, origin: Option<&str>) -> Topology {
        let known = self
            .circular_codes
            .iter()
            .filter_map(|c| LineCode::parse(c).ok())
            .any(|c| &c == code);
        let marked = normalize_opt(origin).is_some_and(|o| self.circular_markers.contains(&o));
        if known || marked {
            Topology::OneWayCircular
        } else {
            Topology::Linear
        }
    }
}

/// Whether a stop record is a boarding point or only shapes the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopKind {
    Physical,
    Waypoint,
}

impl StopKind {
    /// Parse a normalised `uso` value. Unknown values count as physical.
    pub fn from_normalized(tag: &str) -> Self {
        match tag {
            "recorrido" | "ruta" | "trazado" | "waypoint" | "path" => StopKind::Waypoint,
            _ => StopKind::Physical,
        }
    }
}

/// Convert a line record.
pub fn convert_line(record: &LineRecord, config: &RepositoryConfig) -> Result<Line, DomainError> {
    let code = LineCode::parse(record.codigo.as_deref().unwrap_or_default())?;

    let category = match normalize_opt(record.categoria.as_deref()) {
        Some(c) => Category::from_normalized(&c)?,
        None => return Err(DomainError::UnknownCategory(String::new())),
    };

    let name = record
        .nombre
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(code.as_str())
        .to_string();

    let mut line = Line::new(code, category, name);
    line.color = record.color.clone().filter(|c| !c.trim().is_empty());
    line.operating = record.operativa.unwrap_or(true);
    line.topology = config.topology(&line.code, record.origen.as_deref());
    line.weekday_start = parse_time_field(&line.code, "hora_inicio", record.hora_inicio.as_deref());
    line.weekday_end = parse_time_field(&line.code, "hora_fin", record.hora_fin.as_deref());
    if let (Some(start), Some(end)) = (line.weekday_start, line.weekday_end) {
        if end <= start {
            debug!(
                line = %line.code,
                %start,
                %end,
                "Overnight weekday window not supported, line has no weekday service"
            );
        }
    }
    line.weekend_windows = record
        .horarios_fin_semana
        .iter()
        .filter_map(|text| match ServiceWindow::parse(text) {
            Ok(window) => Some(window),
            Err(e) => {
                debug!(
                    line = %line.code,
                    window = %text,
                    error = %e,
                    "Dropping malformed or overnight window"
                );
                None
            }
        })
        .collect();
    line.weekday_frequency_mins = positive_minutes(record.frecuencia);
    line.weekend_frequency_mins = positive_minutes(record.frecuencia_fin_semana);
    line.average_speed_kmh = record.velocidad_promedio.filter(|s| s.is_finite() && *s > 0.0);
    line.fleet_size = record
        .cupo
        .filter(|n| n.is_finite() && *n >= 1.0)
        .map(|n| n.round() as u32);
    line.cities = normalized_list(&record.ciudad);
    line.parishes = normalized_list(&record.parroquia);

    Ok(line)
}

/// Convert a stop record. `line` is used when the record does not name its
/// owning line.
pub fn convert_stop(record: &StopRecord, line: Option<&LineCode>) -> Result<Stop, DomainError> {
    let code = StopCode::parse(record.codigo.as_deref().unwrap_or_default())?;

    let owner = match (record.linea.as_deref(), line) {
        (Some(text), _) if !text.trim().is_empty() => LineCode::parse(text)?,
        (_, Some(code)) => code.clone(),
        _ => return Err(DomainError::InvalidCode("stop has no owning line")),
    };

    let order = record
        .orden
        .filter(|o| o.is_finite())
        .ok_or(DomainError::InvalidRecord("stop has no sequence order"))?
        .round() as i64;

    let coord = Coord::from_parts(record.lat, record.lng);

    let mut stop = Stop::new(code, owner, coord, order);
    stop.name = record
        .nombre
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(String::from);
    stop.direction = normalize_opt(record.sentido.as_deref())
        .as_deref()
        .and_then(Direction::from_normalized);
    stop.coverage = normalize_opt(record.cobertura.as_deref())
        .as_deref()
        .and_then(Coverage::from_normalized);
    stop.end_of_route = record.fin_ruta.unwrap_or(false);
    stop.terminal = record.terminal.unwrap_or(false);
    stop.visible = normalize_opt(record.uso.as_deref())
        .map_or(StopKind::Physical, |u| StopKind::from_normalized(&u))
        == StopKind::Physical;
    stop.city = normalize_opt(record.ciudad.as_deref());
    stop.parish = normalize_opt(record.parroquia.as_deref());

    Ok(stop)
}

fn parse_time_field(
    line: &LineCode,
    field: &'static str,
    text: Option<&str>,
) -> Option<chrono::NaiveTime> {
    let text = text?.trim();
    if text.is_empty() {
        return None;
    }
    match parse_hhmm(text) {
        Ok(t) => Some(t),
        Err(e) => {
            debug!(line = %line, field, value = %text, error = %e, "Dropping malformed time");
            None
        }
    }
}

fn positive_minutes(value: Option<f64>) -> Option<u32> {
    value
        .filter(|v| v.is_finite() && *v >= 1.0)
        .map(|v| v.round() as u32)
}

fn normalized_list(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = values.iter().filter_map(|v| normalize_opt(Some(v))).collect();
    out.dedup();
    out
}
