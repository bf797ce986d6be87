use super::domain::{GeoPoint, Listing, ListingId, NeighbourhoodColumn, NEIGHBOURHOOD_CANDIDATES};
use super::sources::ListingsTable;
use csv::StringRecord;
use tracing::warn;

/// Columns every listings table must carry, in the order they are checked.
pub const REQUIRED_COLUMNS: [&str; 5] = ["latitude", "longitude", "name", "predicted_price", "id"];

const PRICE_COLUMN: &str = "price";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("Required column `{0}` missing in dataset!")]
    MissingColumn(&'static str),
    #[error("row {row}: column `{column}` holds '{value}', expected a number")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("row {row}: predicted price {value} is negative")]
    NegativePrice { row: usize, value: f64 },
}

/// Picks the first neighbourhood-like column present, if any.
pub fn detect_neighbourhood_column(table: &ListingsTable) -> Option<NeighbourhoodColumn> {
    NEIGHBOURHOOD_CANDIDATES
        .into_iter()
        .find(|candidate| table.has_column(candidate))
        .map(NeighbourhoodColumn)
}

/// Column positions of a listings table that passed validation.
#[derive(Debug, Clone)]
pub struct ListingSchema {
    id: usize,
    name: usize,
    latitude: usize,
    longitude: usize,
    predicted_price: usize,
    price: Option<usize>,
    neighbourhood: Option<(NeighbourhoodColumn, usize)>,
}

impl ListingSchema {
    pub fn validate(table: &ListingsTable) -> Result<Self, SchemaError> {
        for column in REQUIRED_COLUMNS {
            if !table.has_column(column) {
                warn!(column, "listings table failed schema validation");
                return Err(SchemaError::MissingColumn(column));
            }
        }

        let index = |column: &'static str| {
            table
                .column_index(column)
                .ok_or(SchemaError::MissingColumn(column))
        };

        let neighbourhood = detect_neighbourhood_column(table).and_then(|column| {
            table
                .column_index(column.name())
                .map(|position| (column, position))
        });

        Ok(Self {
            id: index("id")?,
            name: index("name")?,
            latitude: index("latitude")?,
            longitude: index("longitude")?,
            predicted_price: index("predicted_price")?,
            price: table.column_index(PRICE_COLUMN),
            neighbourhood,
        })
    }

    pub fn neighbourhood_column(&self) -> Option<&NeighbourhoodColumn> {
        self.neighbourhood.as_ref().map(|(column, _)| column)
    }

    /// Types every row. Rows missing a coordinate or prediction are left out,
    /// since such rows can never satisfy a price filter.
    pub fn decode(&self, table: &ListingsTable) -> Result<Vec<Listing>, SchemaError> {
        let mut listings = Vec::with_capacity(table.len());
        let mut skipped = 0usize;

        for (offset, record) in table.rows().iter().enumerate() {
            match self.decode_row(offset + 1, record)? {
                Some(listing) => listings.push(listing),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!(
                skipped,
                kept = listings.len(),
                "listings without coordinates or predicted price were skipped"
            );
        }

        Ok(listings)
    }

    fn decode_row(&self, row: usize, record: &StringRecord) -> Result<Option<Listing>, SchemaError> {
        let latitude = number(record, row, self.latitude, "latitude")?;
        let longitude = number(record, row, self.longitude, "longitude")?;
        let predicted_price = number(record, row, self.predicted_price, "predicted_price")?;

        let (Some(latitude), Some(longitude), Some(predicted_price)) =
            (latitude, longitude, predicted_price)
        else {
            return Ok(None);
        };

        if predicted_price < 0.0 {
            return Err(SchemaError::NegativePrice {
                row,
                value: predicted_price,
            });
        }

        Ok(Some(Listing {
            id: ListingId(text(record, self.id).unwrap_or_default()),
            name: text(record, self.name).unwrap_or_default(),
            location: GeoPoint {
                latitude,
                longitude,
            },
            predicted_price,
            price: self.price.and_then(|position| text(record, position)),
            neighbourhood: self
                .neighbourhood
                .as_ref()
                .and_then(|(_, position)| text(record, *position)),
        }))
    }
}

fn text(record: &StringRecord, position: usize) -> Option<String> {
    record
        .get(position)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn number(
    record: &StringRecord,
    row: usize,
    position: usize,
    column: &'static str,
) -> Result<Option<f64>, SchemaError> {
    let raw = record.get(position).unwrap_or_default();
    if raw.is_empty() {
        return Ok(None);
    }

    match raw.parse::<f64>() {
        Ok(value) if value.is_nan() => Ok(None),
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(SchemaError::InvalidValue {
            row,
            column,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> ListingsTable {
        ListingsTable::from_reader(csv.as_bytes()).expect("csv parses")
    }

    #[test]
    fn first_missing_required_column_is_named() {
        let error = ListingSchema::validate(&table("id,name,predicted_price\n1,Loft,100\n"))
            .expect_err("latitude and longitude missing");
        assert_eq!(error, SchemaError::MissingColumn("latitude"));
        assert_eq!(error.to_string(), "Required column `latitude` missing in dataset!");
    }

    #[test]
    fn neighbourhood_detection_prefers_cleansed_column() {
        let listings = table(
            "id,name,latitude,longitude,predicted_price,neighbourhood_group,neighbourhood_cleansed\n",
        );
        assert_eq!(
            detect_neighbourhood_column(&listings),
            Some(NeighbourhoodColumn("neighbourhood_cleansed"))
        );

        let listings = table("id,name,latitude,longitude,predicted_price\n");
        assert_eq!(detect_neighbourhood_column(&listings), None);
    }

    #[test]
    fn decode_types_rows_and_keeps_optional_fields() {
        let listings = table(
            "id,name,latitude,longitude,predicted_price,price,neighbourhood\n\
             42,Canal loft,52.37,4.89,131.6,$140.00,Centrum-West\n\
             43,Attic,52.36,4.90,88,,\n",
        );
        let schema = ListingSchema::validate(&listings).expect("valid");
        let rows = schema.decode(&listings).expect("decodes");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, ListingId("42".to_string()));
        assert_eq!(rows[0].price.as_deref(), Some("$140.00"));
        assert_eq!(rows[0].neighbourhood.as_deref(), Some("Centrum-West"));
        assert_eq!(rows[1].price, None);
        assert_eq!(rows[1].neighbourhood, None);
        assert!(schema.price.is_some());
    }

    #[test]
    fn blank_prediction_drops_the_row() {
        let listings = table(
            "id,name,latitude,longitude,predicted_price\n1,A,52.3,4.8,\n2,B,52.3,4.8,NaN\n3,C,52.3,4.8,75\n",
        );
        let schema = ListingSchema::validate(&listings).expect("valid");
        let rows = schema.decode(&listings).expect("decodes");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "C");
    }

    #[test]
    fn unparseable_number_names_row_and_column() {
        let listings = table("id,name,latitude,longitude,predicted_price\n1,A,north,4.8,75\n");
        let schema = ListingSchema::validate(&listings).expect("valid");
        let error = schema.decode(&listings).expect_err("latitude is text");
        assert_eq!(
            error,
            SchemaError::InvalidValue {
                row: 1,
                column: "latitude",
                value: "north".to_string()
            }
        );
    }

    #[test]
    fn negative_prediction_is_rejected() {
        let listings = table("id,name,latitude,longitude,predicted_price\n1,A,52.3,4.8,-5\n");
        let schema = ListingSchema::validate(&listings).expect("valid");
        assert!(matches!(
            schema.decode(&listings),
            Err(SchemaError::NegativePrice { row: 1, .. })
        ));
    }
}
