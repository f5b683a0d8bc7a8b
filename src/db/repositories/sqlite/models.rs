use diesel::prelude::*;

use super::schema::stations;
use crate::api::Station;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = stations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StationRow {
    #[allow(dead_code)] // surrogate key, not exposed through the API
    pub id: i32,
    pub station: String,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
}

impl From<StationRow> for Station {
    fn from(row: StationRow) -> Self {
        Station {
            station: row.station,
            name: row.name,
            latitude: row.latitude,
            longitude: row.longitude,
            elevation: row.elevation,
        }
    }
}
