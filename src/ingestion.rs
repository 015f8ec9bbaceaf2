//! CSV loaders for the intake sheet and the price table.
//!
//! Headers are matched by name, not position, with one exception: production
//! exports of the intake sheet are known to ship a handful of broken headers
//! (a blank date column, unnamed origin/legajo columns, `MEZCLA` instead of
//! `MATERIAL`). Those are canonicalized before deserialization so the same
//! loader accepts clean and broken exports alike.

use crate::error::Result;
use crate::pricing::PriceTable;
use crate::schema::RawRecord;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use std::path::Path;

/// Known broken header names and their canonical replacements.
const HEADER_ALIASES: &[(&str, &str)] = &[
    ("Unnamed: 1", "ORIGEN"),
    ("Unnamed: 2", "NRO LEGAJO"),
    ("MEZCLA", "MATERIAL"),
];

/// Canonical names for blank headers, by column position.
const BLANK_HEADER_POSITIONS: &[(usize, &str)] = &[(0, "FECHA"), (1, "ORIGEN"), (2, "NRO LEGAJO")];

fn canonicalize_headers(headers: &StringRecord) -> StringRecord {
    let mut canonical = StringRecord::new();

    for (index, header) in headers.iter().enumerate() {
        let trimmed = header.trim();

        let name = if trimmed.is_empty() {
            BLANK_HEADER_POSITIONS
                .iter()
                .find(|(position, _)| *position == index)
                .map(|(_, name)| *name)
                .unwrap_or(trimmed)
        } else {
            HEADER_ALIASES
                .iter()
                .find(|(alias, _)| alias.eq_ignore_ascii_case(trimmed))
                .map(|(_, name)| *name)
                .unwrap_or(trimmed)
        };

        canonical.push_field(name);
    }

    canonical
}

/// Parses an intake-sheet CSV export into raw rows, in file order.
///
/// Values are trimmed; missing columns deserialize as empty strings. No
/// coercion happens here — rows go through [`crate::IntakeDataset::from_raw`]
/// afterwards, so a malformed cell never rejects the file.
pub fn load_intake_csv(input: &str) -> Result<Vec<RawRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(input.as_bytes());

    let headers = reader.headers()?.clone();
    reader.set_headers(canonicalize_headers(&headers));

    let mut rows = Vec::new();
    for result in reader.deserialize::<RawRecord>() {
        rows.push(result?);
    }
    Ok(rows)
}

/// Reads an intake-sheet CSV export from disk.
pub fn load_intake_file(path: &Path) -> Result<Vec<RawRecord>> {
    let contents = std::fs::read_to_string(path)?;
    load_intake_csv(&contents)
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    #[serde(rename = "MATERIAL", default)]
    material: String,

    #[serde(rename = "PRECIO POR KG", default)]
    price_per_kg: String,
}

/// Parses the price-table CSV (`MATERIAL`, `PRECIO POR KG`).
///
/// Rows with an empty material or an unparseable price are dropped, matching
/// how the operator's sheet treats incomplete rows. Material keys are
/// normalized on insert.
pub fn load_price_csv(input: &str) -> Result<PriceTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(input.as_bytes());

    let mut table = PriceTable::new();
    for result in reader.deserialize::<PriceRow>() {
        let row = result?;
        if row.material.is_empty() {
            continue;
        }
        if let Ok(price) = row.price_per_kg.parse::<f64>() {
            table.insert(&row.material, price);
        }
    }
    Ok(table)
}

/// Reads a price-table CSV from disk.
pub fn load_price_file(path: &Path) -> Result<PriceTable> {
    let contents = std::fs::read_to_string(path)?;
    load_price_csv(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN_CSV: &str = "\
FECHA,ORIGEN,NRO LEGAJO,APELLIDO,NOMBRE,APODO,DNI,CUIT,FRECUENCIA DE PAGO,MODALIDAD DE PAGO,MATERIAL,KG,OBSERVACIONES
05/03/2021,Avellaneda,12,Gomez,Ana,,33222111,20-12345678-9,Semanal,Efectivo,PLASTICO,120,
06/03/2021,Avellaneda,13,Perez,Luis,,31555444,27-98765432-1,Semanal,Efectivo,carton,80,llego tarde
";

    const BROKEN_HEADERS_CSV: &str = "\
 ,Unnamed: 1,Unnamed: 2,APELLIDO,NOMBRE,APODO,DNI,CUIT,FRECUENCIA DE PAGO,MODALIDAD DE PAGO,MEZCLA,KG,OBSERVACIONES
05/03/2021,Avellaneda,12,Gomez,Ana,,33222111,20-12345678-9,Semanal,Efectivo,PLASTICO,120,
";

    #[test]
    fn test_clean_export_rows_in_file_order() {
        let rows = load_intake_csv(CLEAN_CSV).unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].date, "05/03/2021");
        assert_eq!(rows[0].tax_id, "20-12345678-9");
        assert_eq!(rows[0].material, "PLASTICO");
        assert_eq!(rows[0].weight_kg, "120");

        assert_eq!(rows[1].last_name, "Perez");
        assert_eq!(rows[1].notes, "llego tarde");
    }

    #[test]
    fn test_broken_headers_are_canonicalized() {
        let rows = load_intake_csv(BROKEN_HEADERS_CSV).unwrap();
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.date, "05/03/2021");
        assert_eq!(row.origin, "Avellaneda");
        assert_eq!(row.file_number, "12");
        assert_eq!(row.material, "PLASTICO");
    }

    #[test]
    fn test_missing_optional_columns_default_to_empty() {
        let csv = "\
FECHA,CUIT,MATERIAL,KG
05/03/2021,20-12345678-9,Carton,50
";
        let rows = load_intake_csv(csv).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].origin, "");
        assert_eq!(rows[0].notes, "");
        assert_eq!(rows[0].weight_kg, "50");
    }

    #[test]
    fn test_header_only_intake_export() {
        let csv = "FECHA,CUIT,MATERIAL,KG\n";
        let rows = load_intake_csv(csv).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_price_table_loads_and_normalizes() {
        let csv = "\
MATERIAL,PRECIO POR KG
PLASTICO,10
Plastico_Bono,15.5
carton,5
";
        let table = load_price_csv(csv).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get("Plastico"), Some(10.0));
        assert_eq!(table.get("Plastico_Bono"), Some(15.5));
        assert_eq!(table.get("Carton"), Some(5.0));
    }

    #[test]
    fn test_price_rows_without_price_are_dropped() {
        let csv = "\
MATERIAL,PRECIO POR KG
Plastico,10
Vidrio,
,7
Nylon,consultar
";
        let table = load_price_csv(csv).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("Plastico"), Some(10.0));
        assert!(!table.contains("Vidrio"));
        assert!(!table.contains("Nylon"));
    }
}
