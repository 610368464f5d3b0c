//! Static description of the datasets the pipeline works with.
//!
//! A [`Catalog`] names the CMAP tables holding cyanobacteria observations
//! ([`CyanoSource`]) and the environmental tables every observation is
//! colocalized against ([`EnvironmentalDataset`]). The built-in catalog
//! returned by [`Catalog::default`] is the curated set used to build the
//! compiled cyanobacteria table; custom catalogs can be loaded from JSON.

use crate::error::CyanoError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A CMAP table holding cyanobacteria abundance measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CyanoSource {
    /// CMAP table name (e.g. `tblSeaFlow`).
    pub table: String,
    /// Fields retrieved on top of `time`, `lat`, `lon` and (when present) `depth`.
    pub fields: Vec<String>,
}

impl CyanoSource {
    pub fn new(table: &str, fields: &[&str]) -> Self {
        Self {
            table: table.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Largest accepted time tolerance when loading a catalog: one century.
pub const MAX_TIME_TOLERANCE_DAYS: f64 = 36_525.0;

/// Half-widths of the colocalization window.
///
/// Serialized as a `[time, lat, lon, depth]` array. Deserialization rejects
/// negative or non-finite values and time tolerances above
/// [`MAX_TIME_TOLERANCE_DAYS`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct Tolerances {
    /// Temporal half-width in days.
    pub time_days: f64,
    /// Latitude half-width in degrees.
    pub lat_deg: f64,
    /// Longitude half-width in degrees.
    pub lon_deg: f64,
    /// Depth half-width in meters.
    pub depth_m: f64,
}

impl Tolerances {
    pub fn new(time_days: f64, lat_deg: f64, lon_deg: f64, depth_m: f64) -> Self {
        Self {
            time_days,
            lat_deg,
            lon_deg,
            depth_m,
        }
    }
}

impl TryFrom<[f64; 4]> for Tolerances {
    type Error = String;

    fn try_from(v: [f64; 4]) -> Result<Self, Self::Error> {
        if let Some(bad) = v.iter().find(|t| !t.is_finite() || **t < 0.0) {
            return Err(format!(
                "tolerances must be finite and non-negative, got {}",
                bad
            ));
        }
        if v[0] > MAX_TIME_TOLERANCE_DAYS {
            return Err(format!(
                "time tolerance of {} days exceeds {} days",
                v[0], MAX_TIME_TOLERANCE_DAYS
            ));
        }
        Ok(Self::new(v[0], v[1], v[2], v[3]))
    }
}

impl From<Tolerances> for [f64; 4] {
    fn from(t: Tolerances) -> Self {
        [t.time_days, t.lat_deg, t.lon_deg, t.depth_m]
    }
}

/// An environmental CMAP table and the variables averaged out of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalDataset {
    pub table: String,
    pub variables: Vec<String>,
    pub tolerances: Tolerances,
    /// Whether the table has a `depth` dimension to window on.
    pub has_depth: bool,
    /// Climatologies are monthly long-term means and are always matched by calendar month.
    pub is_climatology: bool,
}

impl EnvironmentalDataset {
    pub fn new(
        table: &str,
        variables: &[&str],
        tolerances: Tolerances,
        has_depth: bool,
        is_climatology: bool,
    ) -> Self {
        Self {
            table: table.to_string(),
            variables: variables.iter().map(|v| v.to_string()).collect(),
            tolerances,
            has_depth,
            is_climatology,
        }
    }
}

/// The full set of cyanobacteria sources and environmental datasets of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub cyano_sources: Vec<CyanoSource>,
    /// Ordered: the colocalized and compiled tables follow this order.
    pub environmental: Vec<EnvironmentalDataset>,
}

impl Catalog {
    pub fn new(cyano_sources: Vec<CyanoSource>, environmental: Vec<EnvironmentalDataset>) -> Self {
        Self {
            cyano_sources,
            environmental,
        }
    }

    /// All environmental variable names, in catalog order.
    pub fn env_variables(&self) -> Vec<&str> {
        self.environmental
            .iter()
            .flat_map(|env| env.variables.iter().map(String::as_str))
            .collect()
    }

    /// Parses a catalog from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Loads a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`CyanoError::CatalogRead`] if the file cannot be read and
    /// [`CyanoError::CatalogParse`] if it is not a valid catalog.
    pub fn from_json_file(path: &Path) -> Result<Self, CyanoError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CyanoError::CatalogRead(path.to_path_buf(), e))?;
        Self::from_json_str(&raw).map_err(|e| CyanoError::CatalogParse(path.to_path_buf(), e))
    }

    /// The curated cyanobacteria sources.
    pub fn default_cyano_sources() -> Vec<CyanoSource> {
        const ZUBKOV: [&str; 3] = [
            "prochlorococcus_abundance_P701A90Z_Zubkov",
            "synechococcus_abundance_P700A90Z_Zubkov",
            "picoeukaryotic_abundance_PYEUA00A_Zubkov",
        ];
        const TARRAN: [&str; 3] = [
            "prochlorococcus_abundance_P701A90Z_Tarran",
            "synechococcus_abundance_P700A90Z_Tarran",
            "picoeukaryotic_abundance_PYEUA00A_Tarran",
        ];

        let mut sources = vec![
            CyanoSource::new(
                "tblSeaFlow",
                &[
                    "cruise",
                    "abundance_prochloro",
                    "abundance_synecho",
                    "abundance_picoeuk",
                ],
            ),
            CyanoSource::new(
                "tblFlombaum",
                &[
                    "prochlorococcus_abundance_flombaum",
                    "synechococcus_abundance_flombaum",
                ],
            ),
            CyanoSource::new(
                "tblGlobal_PicoPhytoPlankton",
                &[
                    "prochlorococcus_abundance",
                    "synechococcus_abundance",
                    "picoeukaryote_abundance",
                ],
            ),
        ];
        for table in [
            "tblJR19980514_AMT06_Flow_Cytometry",
            "tblJR20030512_AMT12_Flow_Cytometry",
            "tblJR20030910_AMT13_Flow_Cytometry",
            "tblJR20040428_AMT14_Flow_Cytometry",
        ] {
            sources.push(CyanoSource::new(table, &ZUBKOV));
        }
        // AMT15 has no picoeukaryote measurements.
        sources.push(CyanoSource::new("tblD284_AMT15_Flow_Cytometry", &ZUBKOV[..2]));
        sources.push(CyanoSource::new("tblD294_AMT16_Flow_Cytometry", &TARRAN));
        sources.push(CyanoSource::new("tblD299_AMT17_Flow_Cytometry", &ZUBKOV));
        for table in [
            "tblJR20081003_AMT18_flow_cytometry",
            "tblJC039_AMT19_flow_cytometry",
            "tblJC053_AMT20_flow_cytometry",
            "tblD371_AMT21_flow_cytometry",
            "tblJC079_AMT22_flow_cytometry",
            "tblJR20131005_AMT23_flow_cytometry",
            "tblJR20140922_AMT24_flow_cytometry",
            "tblJR15001_AMT25_flow_cytometry",
            "tblDY110_AMT29_flow_cytometry",
        ] {
            sources.push(CyanoSource::new(table, &TARRAN));
        }
        sources
    }

    /// The curated environmental datasets, in output column order.
    pub fn default_environmental() -> Vec<EnvironmentalDataset> {
        vec![
            EnvironmentalDataset::new(
                "tblSST_AVHRR_OI_NRT",
                &["sst"],
                Tolerances::new(1.0, 0.25, 0.25, 5.0),
                false,
                false,
            ),
            EnvironmentalDataset::new(
                "tblCHL_REP",
                &["chl"],
                Tolerances::new(4.0, 0.25, 0.25, 5.0),
                false,
                false,
            ),
            EnvironmentalDataset::new(
                "tblSSS_NRT",
                &["sss"],
                Tolerances::new(1.0, 0.25, 0.25, 5.0),
                false,
                false,
            ),
            EnvironmentalDataset::new(
                "tblModis_PAR",
                &["PAR"],
                Tolerances::new(1.0, 0.25, 0.25, 5.0),
                false,
                false,
            ),
            EnvironmentalDataset::new(
                "tblAltimetry_REP",
                &["sla", "adt", "ugosa", "vgosa"],
                Tolerances::new(1.0, 0.25, 0.25, 5.0),
                false,
                false,
            ),
            EnvironmentalDataset::new(
                "tblPisces_NRT",
                &["NO3", "PO4", "Fe", "O2", "Si", "PP"],
                Tolerances::new(4.0, 0.5, 0.5, 5.0),
                true,
                false,
            ),
            EnvironmentalDataset::new(
                "tblWOA_Climatology",
                &[
                    "density_WOA_clim",
                    "salinity_WOA_clim",
                    "nitrate_WOA_clim",
                    "phosphate_WOA_clim",
                    "silicate_WOA_clim",
                    "oxygen_WOA_clim",
                ],
                Tolerances::new(1.0, 0.75, 0.75, 5.0),
                true,
                true,
            ),
        ]
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(Self::default_cyano_sources(), Self::default_environmental())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_env_variables_in_catalog_order() {
        let catalog = Catalog::default();
        let vars = catalog.env_variables();
        assert_eq!(vars.len(), 20);
        assert_eq!(&vars[..5], &["sst", "chl", "sss", "PAR", "sla"]);
        assert_eq!(vars.last(), Some(&"oxygen_WOA_clim"));
    }

    #[test]
    fn test_default_cyano_sources() {
        let sources = Catalog::default_cyano_sources();
        assert_eq!(sources.len(), 19);
        assert_eq!(sources[0].table, "tblSeaFlow");
        let amt15 = sources
            .iter()
            .find(|s| s.table == "tblD284_AMT15_Flow_Cytometry")
            .unwrap();
        assert_eq!(amt15.fields.len(), 2);
    }

    #[test]
    fn test_only_woa_is_climatology() {
        let climatologies: Vec<_> = Catalog::default_environmental()
            .into_iter()
            .filter(|env| env.is_climatology)
            .map(|env| env.table)
            .collect();
        assert_eq!(climatologies, vec!["tblWOA_Climatology".to_string()]);
    }

    #[test]
    fn test_catalog_from_json() {
        let json = r#"{
            "cyanoSources": [{"table": "tblTest", "fields": ["pro_abundance"]}],
            "environmental": [{
                "table": "tblEnv",
                "variables": ["a", "b"],
                "tolerances": [2, 0.5, 0.5, 10],
                "hasDepth": true,
                "isClimatology": false
            }]
        }"#;
        let catalog = Catalog::from_json_str(json).unwrap();
        assert_eq!(catalog.cyano_sources[0].table, "tblTest");
        let env = &catalog.environmental[0];
        assert_eq!(env.tolerances, Tolerances::new(2.0, 0.5, 0.5, 10.0));
        assert!(env.has_depth);
        assert_eq!(catalog.env_variables(), vec!["a", "b"]);

        let back = serde_json::to_value(&catalog).unwrap();
        assert_eq!(back["environmental"][0]["tolerances"][3], 10.0);
    }

    #[test]
    fn test_catalog_rejects_out_of_range_tolerances() {
        let with_tolerances = |tolerances: &str| {
            format!(
                r#"{{
                    "cyanoSources": [],
                    "environmental": [{{
                        "table": "tblEnv",
                        "variables": ["a"],
                        "tolerances": {},
                        "hasDepth": false,
                        "isClimatology": false
                    }}]
                }}"#,
                tolerances
            )
        };
        assert!(Catalog::from_json_str(&with_tolerances("[1e9, 0.5, 0.5, 5]")).is_err());
        assert!(Catalog::from_json_str(&with_tolerances("[1, -0.5, 0.5, 5]")).is_err());
        assert!(Catalog::from_json_str(&with_tolerances("[36525, 0.5, 0.5, 5]")).is_ok());
    }

    #[test]
    fn test_catalog_file_with_bad_tolerance_is_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{"cyanoSources": [], "environmental": [{"table": "t", "variables": ["v"],
                "tolerances": [1e12, 1, 1, 1], "hasDepth": false, "isClimatology": false}]}"#,
        )
        .unwrap();
        let err = Catalog::from_json_file(&path).unwrap_err();
        assert!(matches!(err, CyanoError::CatalogParse(..)));
    }

    #[test]
    fn test_catalog_from_missing_file() {
        let err = Catalog::from_json_file(Path::new("/nonexistent/catalog.json")).unwrap_err();
        assert!(matches!(err, CyanoError::CatalogRead(..)));
    }
}
