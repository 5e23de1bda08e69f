//! Modelo de Cliente

use serde::{Deserialize, Serialize};

use crate::services::filtro::Searchable;
use crate::utils::coalesce::de;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    #[serde(deserialize_with = "de::string_or_number", alias = "codigo_cliente")]
    pub codigo: String,
    #[serde(alias = "razon_social")]
    pub nombre: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email2: Option<String>,
}

impl Searchable for Client {
    fn search_fields(&self) -> Vec<&str> {
        [Some(&self.codigo), Some(&self.nombre), self.email.as_ref(), self.email2.as_ref()]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect()
    }
}
