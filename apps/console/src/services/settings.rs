//! Generic create/update/delete flow shared by every settings resource.
//!
//! Each resource declares a field schema; form input is coerced against that
//! schema at submit time. The modal state machine is
//! `Closed -> Open -> [Confirming] -> Submitting -> Closed`, and a failed
//! submission returns to `Open` with the user's input intact.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;
use tracing::debug;

use crate::api::ClientResult;
use crate::models::SettingsRecord;
use crate::services::aggregator::{Generation, RequestGeneration};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    Text,
    LongText,
    Number,
    Integer,
    Boolean,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldType,
    pub required: bool,
}

const fn text(name: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind: FieldType::Text,
        required: true,
    }
}

const fn optional_text(name: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind: FieldType::Text,
        required: false,
    }
}

const fn long_text(name: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind: FieldType::LongText,
        required: false,
    }
}

const fn number(name: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind: FieldType::Number,
        required: true,
    }
}

const fn integer(name: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind: FieldType::Integer,
        required: true,
    }
}

const fn flag(name: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind: FieldType::Boolean,
        required: false,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    PriceTolerance,
    UomConversionRule,
    UomSettings,
    QuantityDeviationRule,
    SiteValidationRule,
    BusinessRule,
    EscalationContact,
    EscalationMatrixEntry,
    SystemConfig,
    User,
    CommunicationTemplate,
    TemplatePlaceholder,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 12] = [
        Self::PriceTolerance,
        Self::UomConversionRule,
        Self::UomSettings,
        Self::QuantityDeviationRule,
        Self::SiteValidationRule,
        Self::BusinessRule,
        Self::EscalationContact,
        Self::EscalationMatrixEntry,
        Self::SystemConfig,
        Self::User,
        Self::CommunicationTemplate,
        Self::TemplatePlaceholder,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Self::PriceTolerance => "price-tolerances",
            Self::UomConversionRule => "uom-conversion-rules",
            Self::UomSettings => "uom-settings",
            Self::QuantityDeviationRule => "quantity-deviation-rules",
            Self::SiteValidationRule => "site-validation-rules",
            Self::BusinessRule => "business-rules",
            Self::EscalationContact => "escalation-contacts",
            Self::EscalationMatrixEntry => "escalation-matrix",
            Self::SystemConfig => "system-config",
            Self::User => "users",
            Self::CommunicationTemplate => "communication-templates",
            Self::TemplatePlaceholder => "template-placeholders",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::PriceTolerance => "Price tolerance",
            Self::UomConversionRule => "UOM conversion rule",
            Self::UomSettings => "UOM setting",
            Self::QuantityDeviationRule => "Quantity deviation rule",
            Self::SiteValidationRule => "Site validation rule",
            Self::BusinessRule => "Business rule",
            Self::EscalationContact => "Escalation contact",
            Self::EscalationMatrixEntry => "Escalation matrix entry",
            Self::SystemConfig => "System config",
            Self::User => "User",
            Self::CommunicationTemplate => "Communication template",
            Self::TemplatePlaceholder => "Template placeholder",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.path() == path)
    }

    pub fn schema(self) -> &'static [FieldSpec] {
        match self {
            Self::PriceTolerance => const { &[
                text("customer_name", "Customer"),
                optional_text("sku", "SKU"),
                number("tolerance_percentage", "Tolerance %"),
                flag("is_active", "Active"),
            ] },
            Self::UomConversionRule => const { &[
                text("from_uom", "From UOM"),
                text("to_uom", "To UOM"),
                number("conversion_factor", "Factor"),
                optional_text("product_code", "Product code"),
                flag("is_active", "Active"),
            ] },
            Self::UomSettings => const { &[
                text("uom_code", "UOM code"),
                optional_text("description", "Description"),
                integer("decimal_places", "Decimal places"),
                flag("is_active", "Active"),
            ] },
            Self::QuantityDeviationRule => const { &[
                text("customer_name", "Customer"),
                number("max_deviation_percentage", "Max deviation %"),
                number("min_quantity", "Min quantity"),
                flag("is_active", "Active"),
            ] },
            Self::SiteValidationRule => const { &[
                text("customer_name", "Customer"),
                text("site_code", "Site code"),
                optional_text("site_name", "Site name"),
                long_text("delivery_address", "Delivery address"),
                flag("is_active", "Active"),
            ] },
            Self::BusinessRule => const { &[
                text("rule_name", "Rule"),
                text("rule_type", "Type"),
                long_text("condition", "Condition"),
                long_text("action", "Action"),
                integer("priority", "Priority"),
                flag("is_enabled", "Enabled"),
            ] },
            Self::EscalationContact => const { &[
                text("name", "Name"),
                text("email", "Email"),
                optional_text("phone", "Phone"),
                optional_text("role", "Role"),
                integer("escalation_level", "Level"),
                flag("is_active", "Active"),
            ] },
            Self::EscalationMatrixEntry => const { &[
                text("issue_type", "Issue type"),
                integer("level", "Level"),
                integer("contact_id", "Contact id"),
                integer("wait_minutes", "Wait (min)"),
                text("communication_mode", "Mode"),
                flag("is_active", "Active"),
            ] },
            Self::SystemConfig => const { &[
                text("config_key", "Key"),
                text("config_value", "Value"),
                long_text("description", "Description"),
                flag("is_active", "Active"),
            ] },
            Self::User => const { &[
                text("username", "Username"),
                text("email", "Email"),
                optional_text("full_name", "Full name"),
                text("role", "Role"),
                flag("is_active", "Active"),
            ] },
            Self::CommunicationTemplate => const { &[
                text("template_name", "Template"),
                text("channel", "Channel"),
                optional_text("subject", "Subject"),
                long_text("body", "Body"),
                flag("is_active", "Active"),
            ] },
            Self::TemplatePlaceholder => const { &[
                text("placeholder", "Placeholder"),
                optional_text("description", "Description"),
                optional_text("sample_value", "Sample"),
                flag("is_active", "Active"),
            ] },
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("{field} must be a number (got {value:?})")]
    InvalidNumber { field: &'static str, value: String },
    #[error("{0} is required")]
    MissingField(&'static str),
}

pub type FormValues = BTreeMap<String, String>;

fn is_checked(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "on" | "true" | "1" | "yes")
}

/// Coerces raw form strings into the JSON body for `kind`. Fields outside
/// the schema are not sent.
pub fn coerce_form(kind: ResourceKind, values: &FormValues) -> Result<Value, FormError> {
    let mut body = Map::new();

    for field in kind.schema() {
        let raw = values.get(field.name).map(|value| value.trim()).unwrap_or("");

        let value = match field.kind {
            FieldType::Boolean => Value::Bool(is_checked(raw)),
            _ if raw.is_empty() => {
                if field.required {
                    return Err(FormError::MissingField(field.name));
                }
                Value::Null
            }
            FieldType::Text | FieldType::LongText => Value::String(raw.to_string()),
            FieldType::Integer => raw
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| FormError::InvalidNumber {
                    field: field.name,
                    value: raw.to_string(),
                })?,
            FieldType::Number => raw
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| FormError::InvalidNumber {
                    field: field.name,
                    value: raw.to_string(),
                })?,
        };

        body.insert(field.name.to_string(), value);
    }

    for key in values.keys() {
        if !kind.schema().iter().any(|field| field.name == key) {
            debug!(resource = kind.path(), field = %key, "dropping field outside schema");
        }
    }

    Ok(Value::Object(body))
}

/// Turns a stored record back into form strings for the edit dialog.
pub fn form_values_from(kind: ResourceKind, record: &SettingsRecord) -> FormValues {
    kind.schema()
        .iter()
        .map(|field| {
            let value = match (field.kind, record.0.get(field.name)) {
                (FieldType::Boolean, Some(Value::Bool(true))) => "true".to_string(),
                (FieldType::Boolean, _) => String::new(),
                _ => record.display(field.name),
            };
            (field.name.to_string(), value)
        })
        .collect()
}

#[async_trait(?Send)]
pub trait SettingsBackend {
    async fn list(&self, kind: ResourceKind) -> ClientResult<Vec<SettingsRecord>>;
    async fn create(&self, kind: ResourceKind, body: &Value) -> ClientResult<()>;
    async fn update(&self, kind: ResourceKind, id: &str, body: &Value) -> ClientResult<()>;
    async fn delete(&self, kind: ResourceKind, id: &str) -> ClientResult<()>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum ModalMode {
    Create,
    Edit { id: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModalForm {
    pub kind: ResourceKind,
    pub mode: ModalMode,
    pub values: FormValues,
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    Create { body: Value },
    Update { id: String, body: Value },
    Delete { id: String },
}

impl Operation {
    fn verb(&self) -> &'static str {
        match self {
            Self::Create { .. } => "created",
            Self::Update { .. } => "updated",
            Self::Delete { .. } => "deleted",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Mutation {
    pub kind: ResourceKind,
    pub operation: Operation,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pending {
    pub mutation: Mutation,
    /// Form to return to if the mutation fails.
    pub resume: Option<ModalForm>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum ModalState {
    #[default]
    Closed,
    Open(ModalForm),
    Confirming(Pending),
    Submitting(Pending),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Succeeded { kind: ResourceKind, message: String },
    Failed { kind: ResourceKind, message: String },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SettingsModal {
    pub state: ModalState,
}

impl SettingsModal {
    pub fn is_open(&self) -> bool {
        !matches!(self.state, ModalState::Closed)
    }

    pub fn open(&mut self, kind: ResourceKind, mode: ModalMode, item: Option<&SettingsRecord>) {
        let values = match item {
            Some(record) => form_values_from(kind, record),
            None => FormValues::new(),
        };
        self.state = ModalState::Open(ModalForm {
            kind,
            mode,
            values,
            error: None,
        });
    }

    pub fn set_field(&mut self, name: &str, value: String) {
        if let ModalState::Open(form) = &mut self.state {
            form.values.insert(name.to_string(), value);
        }
    }

    /// Creates go straight to `Submitting` and return the mutation to run;
    /// edits stop at `Confirming` and return `None`.
    pub fn submit(&mut self) -> Result<Option<Mutation>, FormError> {
        let ModalState::Open(form) = &mut self.state else {
            return Ok(None);
        };

        let body = match coerce_form(form.kind, &form.values) {
            Ok(body) => body,
            Err(err) => {
                form.error = Some(err.to_string());
                return Err(err);
            }
        };
        form.error = None;

        let form = form.clone();
        let operation = match &form.mode {
            ModalMode::Create => Operation::Create { body },
            ModalMode::Edit { id } => Operation::Update {
                id: id.clone(),
                body,
            },
        };
        let pending = Pending {
            mutation: Mutation {
                kind: form.kind,
                operation,
            },
            resume: Some(form),
        };

        if matches!(pending.mutation.operation, Operation::Create { .. }) {
            let mutation = pending.mutation.clone();
            self.state = ModalState::Submitting(pending);
            Ok(Some(mutation))
        } else {
            self.state = ModalState::Confirming(pending);
            Ok(None)
        }
    }

    pub fn request_delete(&mut self, kind: ResourceKind, id: String) {
        let resume = match &self.state {
            ModalState::Open(form) => Some(form.clone()),
            _ => None,
        };
        self.state = ModalState::Confirming(Pending {
            mutation: Mutation {
                kind,
                operation: Operation::Delete { id },
            },
            resume,
        });
    }

    pub fn confirm(&mut self) -> Option<Mutation> {
        match std::mem::take(&mut self.state) {
            ModalState::Confirming(pending) => {
                let mutation = pending.mutation.clone();
                self.state = ModalState::Submitting(pending);
                Some(mutation)
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    pub fn cancel(&mut self) {
        self.state = match std::mem::take(&mut self.state) {
            ModalState::Confirming(pending) => pending
                .resume
                .map(ModalState::Open)
                .unwrap_or(ModalState::Closed),
            ModalState::Submitting(pending) => ModalState::Submitting(pending),
            _ => ModalState::Closed,
        };
    }

    pub fn finish(&mut self, result: Result<(), String>) -> Option<Outcome> {
        let ModalState::Submitting(pending) = std::mem::take(&mut self.state) else {
            return None;
        };
        let kind = pending.mutation.kind;

        match result {
            Ok(()) => Some(Outcome::Succeeded {
                kind,
                message: format!("{} {}", kind.label(), pending.mutation.operation.verb()),
            }),
            Err(message) => {
                self.state = match pending.resume {
                    Some(mut form) => {
                        form.error = Some(message.clone());
                        ModalState::Open(form)
                    }
                    None => ModalState::Closed,
                };
                Some(Outcome::Failed { kind, message })
            }
        }
    }
}

/// Records of the active settings tab.
#[derive(Clone, Debug)]
pub struct SettingsTable {
    pub kind: ResourceKind,
    pub records: Vec<SettingsRecord>,
    pub is_loading: bool,
    pub error: Option<String>,
    generations: RequestGeneration,
}

impl SettingsTable {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            records: Vec::new(),
            is_loading: false,
            error: None,
            generations: RequestGeneration::default(),
        }
    }

    /// Starts a load for `kind`. Switching tabs drops the old rows at once so
    /// they are never shown under the wrong headings.
    pub fn begin(&mut self, kind: ResourceKind) -> Generation {
        if self.kind != kind {
            self.records.clear();
            self.kind = kind;
        }
        self.is_loading = true;
        self.error = None;
        self.generations.issue()
    }

    pub fn apply(&mut self, generation: Generation, result: ClientResult<Vec<SettingsRecord>>) {
        if !self.generations.is_latest(generation) {
            debug!(?generation, resource = self.kind.path(), "discarding superseded settings list");
            return;
        }
        self.is_loading = false;
        match result {
            Ok(records) => {
                self.records = records;
                self.error = None;
            }
            Err(err) => self.error = Some(err.to_string()),
        }
    }
}

pub async fn load<B>(backend: &B, kind: ResourceKind) -> ClientResult<Vec<SettingsRecord>>
where
    B: SettingsBackend + ?Sized,
{
    backend.list(kind).await
}

pub async fn execute<B>(backend: &B, mutation: &Mutation) -> ClientResult<()>
where
    B: SettingsBackend + ?Sized,
{
    match &mutation.operation {
        Operation::Create { body } => backend.create(mutation.kind, body).await,
        Operation::Update { id, body } => backend.update(mutation.kind, id, body).await,
        Operation::Delete { id } => backend.delete(mutation.kind, id).await,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use futures::executor::block_on;
    use serde_json::json;

    use super::*;
    use crate::api::ClientError;

    #[derive(Default)]
    struct RecordingBackend {
        calls: RefCell<Vec<String>>,
        reject: bool,
    }

    #[async_trait(?Send)]
    impl SettingsBackend for RecordingBackend {
        async fn list(&self, kind: ResourceKind) -> ClientResult<Vec<SettingsRecord>> {
            self.calls.borrow_mut().push(format!("list {}", kind.path()));
            Ok(Vec::new())
        }

        async fn create(&self, kind: ResourceKind, body: &Value) -> ClientResult<()> {
            self.calls
                .borrow_mut()
                .push(format!("create {} {}", kind.path(), body));
            self.outcome()
        }

        async fn update(&self, kind: ResourceKind, id: &str, _body: &Value) -> ClientResult<()> {
            self.calls
                .borrow_mut()
                .push(format!("update {} {id}", kind.path()));
            self.outcome()
        }

        async fn delete(&self, kind: ResourceKind, id: &str) -> ClientResult<()> {
            self.calls
                .borrow_mut()
                .push(format!("delete {} {id}", kind.path()));
            self.outcome()
        }
    }

    impl RecordingBackend {
        fn outcome(&self) -> ClientResult<()> {
            if self.reject {
                Err(ClientError::Api {
                    status: None,
                    message: "duplicate rule".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn values(pairs: &[(&str, &str)]) -> FormValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn every_resource_has_a_unique_path_and_schema() {
        let mut paths: Vec<&str> = ResourceKind::ALL.iter().map(|kind| kind.path()).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), 12);
        for kind in ResourceKind::ALL {
            assert!(!kind.schema().is_empty());
            assert_eq!(ResourceKind::from_path(kind.path()), Some(kind));
        }
    }

    #[test]
    fn coercion_uses_the_resource_schema() {
        let body = coerce_form(
            ResourceKind::PriceTolerance,
            &values(&[
                ("customer_name", " Lulu "),
                ("tolerance_percentage", "2.5"),
                ("is_active", "on"),
                ("priority", "3"),
            ]),
        )
        .unwrap();

        assert_eq!(
            body,
            json!({
                "customer_name": "Lulu",
                "sku": null,
                "tolerance_percentage": 2.5,
                "is_active": true
            })
        );
    }

    #[test]
    fn same_field_name_coerces_per_resource() {
        // `description` is free text on both; `level` is only numeric on the matrix.
        let matrix = coerce_form(
            ResourceKind::EscalationMatrixEntry,
            &values(&[
                ("issue_type", "price"),
                ("level", "2"),
                ("contact_id", "14"),
                ("wait_minutes", "30"),
                ("communication_mode", "whatsapp"),
            ]),
        )
        .unwrap();
        assert_eq!(matrix["level"], json!(2));
        assert_eq!(matrix["is_active"], json!(false));

        let config = coerce_form(
            ResourceKind::SystemConfig,
            &values(&[
                ("config_key", "level"),
                ("config_value", "2"),
                ("is_active", "true"),
            ]),
        )
        .unwrap();
        assert_eq!(config["config_value"], json!("2"));
    }

    #[test]
    fn invalid_numbers_and_missing_fields_are_rejected() {
        let err = coerce_form(
            ResourceKind::UomSettings,
            &values(&[("uom_code", "CTN"), ("decimal_places", "two")]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            FormError::InvalidNumber {
                field: "decimal_places",
                value: "two".into()
            }
        );

        let err = coerce_form(ResourceKind::User, &values(&[("email", "a@b.c")])).unwrap_err();
        assert_eq!(err, FormError::MissingField("username"));
    }

    #[test]
    fn create_submits_without_confirmation() {
        let mut modal = SettingsModal::default();
        modal.open(ResourceKind::TemplatePlaceholder, ModalMode::Create, None);
        modal.set_field("placeholder", "{{customer}}".into());

        let mutation = modal.submit().unwrap().expect("create dispatches immediately");
        assert!(matches!(modal.state, ModalState::Submitting(_)));
        assert!(matches!(mutation.operation, Operation::Create { .. }));

        let backend = RecordingBackend::default();
        let result = block_on(execute(&backend, &mutation)).map_err(|err| err.to_string());
        let outcome = modal.finish(result).unwrap();

        assert_eq!(modal.state, ModalState::Closed);
        assert!(matches!(outcome, Outcome::Succeeded { ref message, .. } if message == "Template placeholder created"));
        assert_eq!(backend.calls.borrow().len(), 1);
    }

    #[test]
    fn edit_requires_confirmation() {
        let record: SettingsRecord = serde_json::from_value(json!({
            "id": 4,
            "config_key": "sla_hours",
            "config_value": "24",
            "is_active": true
        }))
        .unwrap();

        let mut modal = SettingsModal::default();
        modal.open(
            ResourceKind::SystemConfig,
            ModalMode::Edit { id: "4".into() },
            Some(&record),
        );
        if let ModalState::Open(form) = &modal.state {
            assert_eq!(form.values["config_value"], "24");
            assert_eq!(form.values["is_active"], "true");
        }

        assert_eq!(modal.submit().unwrap(), None);
        assert!(matches!(modal.state, ModalState::Confirming(_)));

        modal.cancel();
        assert!(matches!(modal.state, ModalState::Open(_)));

        modal.submit().unwrap();
        let mutation = modal.confirm().expect("confirmed");
        assert!(matches!(mutation.operation, Operation::Update { ref id, .. } if id == "4"));
        assert!(matches!(modal.state, ModalState::Submitting(_)));
    }

    #[test]
    fn failure_returns_to_open_form_with_input() {
        let mut modal = SettingsModal::default();
        modal.open(ResourceKind::UomConversionRule, ModalMode::Create, None);
        modal.set_field("from_uom", "CTN".into());
        modal.set_field("to_uom", "PCS".into());
        modal.set_field("conversion_factor", "12".into());

        let mutation = modal.submit().unwrap().unwrap();
        let backend = RecordingBackend {
            reject: true,
            ..RecordingBackend::default()
        };
        let result = block_on(execute(&backend, &mutation)).map_err(|err| err.to_string());
        let outcome = modal.finish(result).unwrap();

        assert!(matches!(outcome, Outcome::Failed { ref message, .. } if message == "duplicate rule"));
        match &modal.state {
            ModalState::Open(form) => {
                assert_eq!(form.values["from_uom"], "CTN");
                assert_eq!(form.error.as_deref(), Some("duplicate rule"));
            }
            other => panic!("expected open form, got {other:?}"),
        }
    }

    #[test]
    fn delete_always_confirms() {
        let mut modal = SettingsModal::default();
        modal.request_delete(ResourceKind::User, "31".into());
        assert!(matches!(modal.state, ModalState::Confirming(_)));

        modal.cancel();
        assert_eq!(modal.state, ModalState::Closed);

        modal.request_delete(ResourceKind::User, "31".into());
        let mutation = modal.confirm().unwrap();
        let backend = RecordingBackend::default();
        block_on(execute(&backend, &mutation)).unwrap();
        assert_eq!(backend.calls.borrow()[0], "delete users 31");

        let outcome = modal.finish(Ok(())).unwrap();
        assert!(matches!(outcome, Outcome::Succeeded { .. }));
        assert!(!modal.is_open());
    }

    #[test]
    fn invalid_form_stays_open_with_error() {
        let mut modal = SettingsModal::default();
        modal.open(ResourceKind::BusinessRule, ModalMode::Create, None);
        assert!(modal.submit().is_err());
        match &modal.state {
            ModalState::Open(form) => assert!(form.error.is_some()),
            other => panic!("expected open form, got {other:?}"),
        }
    }

    #[test]
    fn table_keeps_only_latest_tab_load() {
        let backend = RecordingBackend::default();
        let mut table = SettingsTable::new(ResourceKind::PriceTolerance);

        let first = table.begin(ResourceKind::User);
        let second = table.begin(ResourceKind::BusinessRule);
        assert_eq!(table.kind, ResourceKind::BusinessRule);

        let stale: SettingsRecord = serde_json::from_value(json!({"id": 1})).unwrap();
        table.apply(first, Ok(vec![stale]));
        assert!(table.records.is_empty());
        assert!(table.is_loading);

        let rows = block_on(load(&backend, ResourceKind::BusinessRule));
        table.apply(second, rows);
        assert!(!table.is_loading);
        assert_eq!(backend.calls.borrow()[0], "list business-rules");
    }
}
