//! Conversions between drafts and the backend's transaction payloads.

use api_types::transaction::{
    FlowRequest, FlowView, RecordRequest, TransactionDetail, TransactionRequest,
};

use crate::{
    Currency, EngineError, Item, ItemKind, Money, ResultEngine, TransactionDraft, datetime,
};

/// Category id sent for a record whose category was never chosen.
pub const UNSET_CATEGORY: i64 = -1;

impl TransactionDraft {
    /// Seeds an edit draft from a persisted transaction.
    ///
    /// Records come first, then flows. Flows of a remote transaction (no
    /// account) are not editable items: the first one names the remote agent.
    pub fn from_detail(detail: &TransactionDetail) -> ResultEngine<Self> {
        let currency = Currency::from(&detail.currency);
        let decimals = currency.decimals;

        let direct = detail.flows.len() == 1 && detail.flows[0].agent_id == detail.agent_id;

        let remote_agent = match detail.account_id {
            Some(_) => None,
            None => Some(
                detail
                    .flows
                    .first()
                    .map(|flow| flow.agent_desc.clone())
                    .ok_or_else(|| {
                        EngineError::InvalidDetail(format!(
                            "remote transaction {} has no flows",
                            detail.id
                        ))
                    })?,
            ),
        };

        let records = detail.records.iter().map(|record| {
            Item::record(
                Some(record.category_id),
                Some(Money::from_major(record.amount, decimals)),
            )
        });
        let editable_flows: &[FlowView] = match detail.account_id {
            Some(_) => &detail.flows,
            None => &[],
        };
        let flows = editable_flows.iter().map(|flow| {
            Item::flow(
                flow.agent_desc.clone(),
                Some(Money::from_major(flow.amount, decimals)),
            )
        });

        let mut draft = Self {
            account_id: detail.account_id,
            currency: Some(currency),
            date: detail.date_issued.date(),
            time: Some(datetime::to_minutes(detail.date_issued.time())),
            is_expense: detail.is_expense,
            agent: detail.agent.desc.clone(),
            comment: detail.comment.clone().unwrap_or_default(),
            direct,
            remote_agent,
            total: Some(Money::from_major(detail.amount, decimals)),
            items: records.chain(flows).collect(),
            last_updated: None,
        };
        draft.auto_balance();

        tracing::debug!(
            id = detail.id,
            items = draft.items.len(),
            direct,
            "seeded draft from persisted transaction"
        );
        Ok(draft)
    }

    /// Builds the submission payload.
    ///
    /// A direct draft becomes a single flow of the whole total to `agent`.
    /// Blank amounts are sent as `0` and blank categories as
    /// [`UNSET_CATEGORY`]; run [`validate`](Self::validate) first to avoid
    /// sending them.
    pub fn to_request(&self) -> ResultEngine<TransactionRequest> {
        let time = self
            .time
            .ok_or_else(|| EngineError::InvalidTime("time not set".to_string()))?;
        let decimals = self.decimals();
        let major = |amount: Option<Money>| amount.unwrap_or(Money::ZERO).to_major(decimals);

        let (flows, records) = if self.direct {
            (
                vec![FlowRequest {
                    amount: major(self.total),
                    agent: self.agent.clone(),
                }],
                Vec::new(),
            )
        } else {
            let mut flows = Vec::new();
            let mut records = Vec::new();
            for item in &self.items {
                match &item.kind {
                    ItemKind::Flow { agent } => flows.push(FlowRequest {
                        amount: major(item.amount),
                        agent: agent.clone(),
                    }),
                    ItemKind::Record { category_id } => records.push(RecordRequest {
                        amount: major(item.amount),
                        category_id: category_id.unwrap_or(UNSET_CATEGORY),
                    }),
                }
            }
            (flows, records)
        };

        Ok(TransactionRequest {
            account_id: self.account_id,
            currency_id: self.currency.as_ref().map(|c| c.id),
            date_issued: datetime::combine(self.date, time),
            amount: major(self.total),
            agent: self.agent.clone(),
            is_expense: self.is_expense,
            flows,
            records,
            comment: self.comment.clone(),
            remote_agent: self.remote_agent.clone(),
        })
    }
}
