// Region name normalization.
//
// Sales exports spell Mexican states several ways (with and without accents,
// legacy names, long official names). The boundary collection uses one
// spelling per state, so every region goes through `canonical_region` before
// it is grouped or joined.
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

const REGION_NAMES: [(&str, &str); 37] = [
    ("D.F.", "Ciudad de México"),
    ("Mexico", "México"),
    ("Nuevo Leon", "Nuevo León"),
    ("Queretaro", "Querétaro"),
    ("San Luis Potosi", "San Luis Potosí"),
    ("Yucatan", "Yucatán"),
    ("Aguascalientes", "Aguascalientes"),
    ("Baja California", "Baja California"),
    ("Baja California Sur", "Baja California Sur"),
    ("Campeche", "Campeche"),
    ("Chiapas", "Chiapas"),
    ("Chihuahua", "Chihuahua"),
    ("Coahuila de Zaragoza", "Coahuila"),
    ("Colima", "Colima"),
    ("Durango", "Durango"),
    ("Guanajuato", "Guanajuato"),
    ("Guerrero", "Guerrero"),
    ("Hidalgo", "Hidalgo"),
    ("Jalisco", "Jalisco"),
    ("México", "México"),
    ("Michoacán de Ocampo", "Michoacán"),
    ("Morelos", "Morelos"),
    ("Nayarit", "Nayarit"),
    ("Nuevo León", "Nuevo León"),
    ("Oaxaca", "Oaxaca"),
    ("Puebla", "Puebla"),
    ("Querétaro", "Querétaro"),
    ("Quintana Roo", "Quintana Roo"),
    ("San Luis Potosí", "San Luis Potosí"),
    ("Sinaloa", "Sinaloa"),
    ("Sonora", "Sonora"),
    ("Tabasco", "Tabasco"),
    ("Tamaulipas", "Tamaulipas"),
    ("Tlaxcala", "Tlaxcala"),
    ("Veracruz de Ignacio de la Llave", "Veracruz"),
    ("Yucatán", "Yucatán"),
    ("Zacatecas", "Zacatecas"),
];

static CANONICAL_BY_RAW: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| REGION_NAMES.iter().copied().collect());

static CANONICAL_NAMES: Lazy<HashSet<&'static str>> =
    Lazy::new(|| REGION_NAMES.iter().map(|(_, canonical)| *canonical).collect());

/// Map a raw region spelling to its canonical label.
///
/// Names missing from the table come back trimmed but otherwise unchanged;
/// callers decide whether to report them (see [`is_known_region`]).
pub fn canonical_region(raw: &str) -> String {
    let name = raw.trim();
    CANONICAL_BY_RAW
        .get(name)
        .map(|c| c.to_string())
        .unwrap_or_else(|| name.to_string())
}

/// Whether the name is a spelling the table knows, raw or canonical.
pub fn is_known_region(name: &str) -> bool {
    let name = name.trim();
    CANONICAL_BY_RAW.contains_key(name) || CANONICAL_NAMES.contains(name)
}
