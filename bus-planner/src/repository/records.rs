//! Raw line and stop records as stored in the document store.
//!
//! Field names follow the store's Spanish schema, with English aliases
//! accepted. Everything is optional and loosely typed here; validation
//! happens in [`super::convert`].

use serde::{Deserialize, Deserializer, Serialize};

/// A line document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineRecord {
    #[serde(alias = "code")]
    pub codigo: Option<String>,

    /// "urbano" / "rural"
    #[serde(alias = "category", alias = "tipo")]
    pub categoria: Option<String>,

    #[serde(alias = "name")]
    pub nombre: Option<String>,

    pub color: Option<String>,

    #[serde(alias = "operating", alias = "activa")]
    pub operativa: Option<bool>,

    /// "circulacion" marks a one-way loop
    #[serde(alias = "origin")]
    pub origen: Option<String>,

    #[serde(alias = "weekday_start")]
    pub hora_inicio: Option<String>,

    #[serde(alias = "weekday_end")]
    pub hora_fin: Option<String>,

    /// Ranges such as "07:00 to 13:30"
    #[serde(alias = "weekend_windows", deserialize_with = "one_or_many")]
    pub horarios_fin_semana: Vec<String>,

    #[serde(alias = "weekday_frequency_mins")]
    pub frecuencia: Option<f64>,

    #[serde(alias = "weekend_frequency_mins")]
    pub frecuencia_fin_semana: Option<f64>,

    #[serde(alias = "average_speed_kmh")]
    pub velocidad_promedio: Option<f64>,

    /// Fleet size
    #[serde(alias = "fleet_size")]
    pub cupo: Option<f64>,

    #[serde(alias = "ciudades", alias = "cities", deserialize_with = "one_or_many")]
    pub ciudad: Vec<String>,

    #[serde(
        alias = "parroquias",
        alias = "parishes",
        deserialize_with = "one_or_many"
    )]
    pub parroquia: Vec<String>,
}

/// A stop document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopRecord {
    #[serde(alias = "code", alias = "id")]
    pub codigo: Option<String>,

    /// Owning line code
    #[serde(alias = "line")]
    pub linea: Option<String>,

    #[serde(alias = "name")]
    pub nombre: Option<String>,

    #[serde(alias = "latitud")]
    pub lat: Option<f64>,

    #[serde(alias = "lon", alias = "longitud")]
    pub lng: Option<f64>,

    #[serde(alias = "order")]
    pub orden: Option<f64>,

    /// "ida" / "vuelta"
    #[serde(alias = "direction")]
    pub sentido: Option<String>,

    /// "normal" / "interna" / "externa"
    #[serde(alias = "coverage")]
    pub cobertura: Option<String>,

    #[serde(alias = "end_of_route")]
    pub fin_ruta: Option<bool>,

    pub terminal: Option<bool>,

    /// "parada" for a physical stop, "recorrido" for a path-only waypoint
    #[serde(alias = "usage")]
    pub uso: Option<String>,

    #[serde(alias = "city")]
    pub ciudad: Option<String>,

    #[serde(alias = "parish")]
    pub parroquia: Option<String>,
}

/// Accept either a single string or a list of strings.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Null(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
        OneOrMany::Null(()) => Vec::new(),
    })
}
