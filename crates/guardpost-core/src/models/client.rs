use serde::{Deserialize, Serialize};

use crate::utils::contains_ignore_case;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Client {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub company_name: String,
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub contact_person: String,
    pub contact_number: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    pub contract_rate: f64,
    /// Derived by the API; recomputed from assignments when absent.
    #[serde(default)]
    pub guards_assigned: Option<u32>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Client {
    pub fn matches_search(&self, query: &str) -> bool {
        query.is_empty()
            || contains_ignore_case(&self.name, query)
            || contains_ignore_case(&self.company_name, query)
            || contains_ignore_case(&self.contact_person, query)
    }

    pub fn display_name(&self) -> &str {
        if self.company_name.is_empty() {
            &self.name
        } else {
            &self.company_name
        }
    }
}

/// Body for `POST /client/` and `PUT /client/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ClientCreate {
    pub name: String,
    pub company_name: String,
    pub contact_person: String,
    pub contact_number: String,
    pub address: Option<String>,
    pub contract_rate: f64,
}

impl From<&Client> for ClientCreate {
    fn from(c: &Client) -> Self {
        Self {
            name: c.name.clone(),
            company_name: c.company_name.clone(),
            contact_person: c.contact_person.clone(),
            contact_number: c.contact_number.clone(),
            address: c.address.clone(),
            contract_rate: c.contract_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_search_and_display() {
        let json = r#"{"id": 2, "name": "Beta Solutions", "contact_person": "Sarah Johnson",
                       "contact_number": "+1234567801", "company_name": "Beta Solutions Inc.",
                       "contract_rate": 200000}"#;
        let client: Client = serde_json::from_str(json).unwrap();
        assert!(client.matches_search("sarah"));
        assert!(client.matches_search("INC."));
        assert!(!client.matches_search("gamma"));
        assert_eq!(client.display_name(), "Beta Solutions Inc.");
        assert_eq!(client.guards_assigned, None);
    }

    #[test]
    fn test_null_strings_and_rate_take_defaults() {
        let json = r#"{"id": 3, "name": "Gamma", "contact_number": "3", "company_name": null,
                       "contact_person": null, "contract_rate": null}"#;
        let client: Client = serde_json::from_str(json).unwrap();
        assert_eq!(client.company_name, "");
        assert_eq!(client.contract_rate, 0.0);
        assert_eq!(client.display_name(), "Gamma");
    }
}
