use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub mod currency {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CurrencyView {
        pub id: i64,
        /// Three letter code (e.g. `EUR`).
        pub code: String,
        /// Number of fraction digits used by amounts in this currency.
        pub decimals: u8,
    }
}

pub mod agent {
    use super::*;

    /// A named counterparty, as returned by the backend.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct AgentView {
        pub id: i64,
        pub desc: String,
    }
}

pub mod account {
    use super::*;
    use crate::currency::CurrencyView;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: i64,
        pub desc: String,
        pub currency_id: i64,
        /// Only present on deep responses (`GET /api/accounts/<id>`).
        #[serde(default)]
        pub currency: Option<CurrencyView>,
        #[serde(default)]
        pub saldo: Option<f64>,
    }
}

pub mod transaction {
    use super::*;
    use crate::{agent::AgentView, currency::CurrencyView};

    /// A persisted flow: money moved to/from a counterparty.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct FlowView {
        pub amount: f64,
        pub agent_id: i64,
        #[serde(default)]
        pub agent_desc: String,
    }

    /// A persisted record: money allocated to a category.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct RecordView {
        pub amount: f64,
        pub category_id: i64,
    }

    /// Deep transaction response (`GET /api/transactions/<id>`).
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TransactionDetail {
        pub id: i64,
        pub amount: f64,
        pub is_expense: bool,
        /// Local wall time, ISO-8601 without offset.
        pub date_issued: NaiveDateTime,
        pub agent_id: i64,
        pub agent: AgentView,
        /// `None` marks a remote transaction (external counterparty only).
        pub account_id: Option<i64>,
        pub currency_id: i64,
        pub currency: CurrencyView,
        #[serde(default)]
        pub comment: Option<String>,
        #[serde(default)]
        pub flows: Vec<FlowView>,
        #[serde(default)]
        pub records: Vec<RecordView>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct FlowRequest {
        pub amount: f64,
        pub agent: String,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct RecordRequest {
        pub amount: f64,
        /// `-1` when no category was chosen.
        pub category_id: i64,
    }

    /// Request body for `POST /api/transactions/add` and
    /// `PUT /api/transactions/<id>/edit`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TransactionRequest {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub account_id: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub currency_id: Option<i64>,
        pub date_issued: NaiveDateTime,
        pub amount: f64,
        pub agent: String,
        pub is_expense: bool,
        pub flows: Vec<FlowRequest>,
        pub records: Vec<RecordRequest>,
        pub comment: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub remote_agent: Option<String>,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Login {
        pub username: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginResponse {
        pub auth: bool,
    }
}

pub mod response {
    use super::*;

    /// Body returned by successful mutations.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Success {
        pub success: bool,
    }

    /// Error body returned by the backend for any non-2xx status.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ErrorMessage {
        pub msg: String,
    }
}

#[cfg(test)]
mod tests {
    use super::transaction::*;

    #[test]
    fn detail_parses_backend_json() {
        let json = r#"{
            "id": 7,
            "amount": 100.0,
            "is_expense": true,
            "date_issued": "2023-03-04T12:30:00",
            "agent_id": 3,
            "agent": {"id": 3, "desc": "Grocery"},
            "account_id": 1,
            "currency_id": 1,
            "currency": {"id": 1, "code": "EUR", "decimals": 2},
            "comment": null,
            "flows": [{"amount": 30.0, "agent_id": 4, "agent_desc": "Bob"}],
            "records": [{"amount": 70.0, "category_id": 2}],
            "user_id": 1,
            "type": "transaction"
        }"#;

        let detail: TransactionDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.account_id, Some(1));
        assert_eq!(detail.currency.decimals, 2);
        assert_eq!(detail.flows[0].agent_desc, "Bob");
        assert_eq!(detail.records[0].category_id, 2);
        assert_eq!(detail.date_issued.to_string(), "2023-03-04 12:30:00");
    }

    #[test]
    fn request_omits_absent_optionals() {
        let request = TransactionRequest {
            account_id: None,
            currency_id: Some(1),
            date_issued: "2023-03-04T12:30:00".parse().unwrap(),
            amount: 10.0,
            agent: "Shop".to_string(),
            is_expense: true,
            flows: vec![],
            records: vec![RecordRequest {
                amount: 10.0,
                category_id: 2,
            }],
            comment: String::new(),
            remote_agent: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("account_id").is_none());
        assert!(value.get("remote_agent").is_none());
        assert_eq!(value["currency_id"], 1);
        assert_eq!(value["date_issued"], "2023-03-04T12:30:00");
    }
}
