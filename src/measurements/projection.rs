use super::descriptors::{DESCRIPTORS, DeviceClass, MeasurementDescriptor, StateClass};
use crate::snapshot::Snapshot;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Displayed scalar of a measurement
#[derive(Debug, Clone, PartialEq)]
pub enum MeasurementValue {
    /// Backing field missing or unusable
    Unknown,
    /// Monetary amount
    Number(f64),
    /// Element count of a list field
    Count(usize),
    /// Any other field, passed through as received
    Raw(Value),
}

impl MeasurementValue {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl fmt::Display for MeasurementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            Self::Number(n) => write!(f, "{}", n),
            Self::Count(c) => write!(f, "{}", c),
            Self::Raw(Value::String(s)) => f.write_str(s),
            Self::Raw(v) => write!(f, "{}", v),
        }
    }
}

impl Serialize for MeasurementValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unknown => serializer.serialize_none(),
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Count(c) => serializer.serialize_u64(*c as u64),
            Self::Raw(v) => v.serialize(serializer),
        }
    }
}

/// Value and attributes read from a snapshot for one descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub value: MeasurementValue,
    pub attributes: Option<Map<String, Value>>,
}

impl Projection {
    fn unknown() -> Self {
        Self {
            value: MeasurementValue::Unknown,
            attributes: None,
        }
    }
}

/// Numbers and numeric strings as finite floats
fn coerce_monetary(value: &Value) -> MeasurementValue {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(f) if f.is_finite() => MeasurementValue::Number(f),
        _ => MeasurementValue::Unknown,
    }
}

fn text_attribute(value: &Value) -> Value {
    match value {
        Value::Number(n) => Value::String(n.to_string()),
        Value::Bool(b) => Value::String(b.to_string()),
        other => other.clone(),
    }
}

/// Read one descriptor's value and attributes out of a snapshot
pub fn project(snapshot: &Snapshot, descriptor: &MeasurementDescriptor) -> Projection {
    let Some(data) = snapshot.get(descriptor.data_key) else {
        return Projection::unknown();
    };

    if descriptor.is_list {
        return match data {
            Value::Array(items) => {
                let mut attributes = Map::new();
                attributes.insert("items".to_string(), data.clone());
                Projection {
                    value: MeasurementValue::Count(items.len()),
                    attributes: Some(attributes),
                }
            }
            _ => Projection::unknown(),
        };
    }

    let Value::Object(fields) = data else {
        return Projection::unknown();
    };

    let value = match descriptor.value_key.and_then(|k| fields.get(k)) {
        None | Some(Value::Null) => MeasurementValue::Unknown,
        Some(v) if descriptor.is_monetary() => coerce_monetary(v),
        Some(v) => MeasurementValue::Raw(v.clone()),
    };

    let attributes: Map<String, Value> = descriptor
        .attribute_keys
        .iter()
        .filter_map(|key| {
            let v = fields.get(*key)?;
            let v = if descriptor.text_attribute_keys.contains(key) {
                text_attribute(v)
            } else {
                v.clone()
            };
            Some(((*key).to_string(), v))
        })
        .collect();

    Projection {
        value,
        attributes: (!attributes.is_empty()).then_some(attributes),
    }
}

/// One rendered measurement with its descriptor metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub key: &'static str,
    pub name: &'static str,
    pub value: MeasurementValue,
    pub attributes: Option<Map<String, Value>>,
    pub unit: Option<&'static str>,
    pub device_class: Option<DeviceClass>,
    pub state_class: Option<StateClass>,
}

impl Measurement {
    pub fn render(snapshot: &Snapshot, descriptor: &MeasurementDescriptor) -> Self {
        let Projection { value, attributes } = project(snapshot, descriptor);
        Self {
            key: descriptor.key,
            name: descriptor.name,
            value,
            attributes,
            unit: descriptor.unit,
            device_class: descriptor.device_class,
            state_class: descriptor.state_class,
        }
    }
}

/// Render every descriptor in table order
pub fn render_all(snapshot: &Snapshot) -> Vec<Measurement> {
    DESCRIPTORS
        .iter()
        .map(|d| Measurement::render(snapshot, d))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurements::descriptor;
    use serde_json::json;

    fn snap(name: &str, value: Value) -> Snapshot {
        [(name, value)].into_iter().collect()
    }

    #[test]
    fn missing_data_key_is_unknown() {
        let p = project(&Snapshot::new(), descriptor("bleu_hc").unwrap());
        assert_eq!(p, Projection::unknown());
    }

    #[test]
    fn text_attributes_are_stringified() {
        let s = snap(
            "now",
            json!({"libTarif": "HP Bleu", "tarifKwh": 0.1609, "codeCouleur": 1}),
        );
        let p = project(&s, descriptor("now_tarif_kwh").unwrap());
        assert_eq!(p.value, MeasurementValue::Raw(json!("HP Bleu")));
        let attrs = p.attributes.unwrap();
        assert_eq!(attrs["tarifKwh"], json!("0.1609"));
        assert_eq!(attrs["codeCouleur"], json!(1));
        assert!(!attrs.contains_key("codeHoraire"));
    }

    #[test]
    fn monetary_rejects_non_finite_and_bools() {
        let d = descriptor("rouge_hp").unwrap();
        for bad in [json!("NaN"), json!("inf"), json!(true), json!({"x": 1})] {
            let p = project(&snap("tarifs", json!({ "rougeHP": bad })), d);
            assert!(p.value.is_unknown());
        }
        let p = project(&snap("tarifs", json!({"rougeHP": " 0.7562 "})), d);
        assert_eq!(p.value, MeasurementValue::Number(0.7562));
    }

    #[test]
    fn object_without_attributes_has_none() {
        let p = project(
            &snap("today", json!({"libCouleur": "Bleu"})),
            descriptor("jour_tempo_today").unwrap(),
        );
        assert_eq!(p.value.to_string(), "Bleu");
        assert!(p.attributes.is_none());
    }

    #[test]
    fn shape_mismatch_is_unknown() {
        let list = descriptor("tempo_24h").unwrap();
        assert!(project(&snap("24h", json!({"a": 1})), list).value.is_unknown());
        let field = descriptor("tempo_stats").unwrap();
        assert!(project(&snap("stats", json!([1, 2])), field).value.is_unknown());
    }

    #[test]
    fn measurement_serializes_unknown_as_null() {
        let m = Measurement::render(&Snapshot::new(), descriptor("bleu_hc").unwrap());
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["value"], Value::Null);
        assert_eq!(v["unit"], json!("EUR/kWh"));
        assert_eq!(v["device_class"], json!("monetary"));
        assert_eq!(v["state_class"], json!("measurement"));
    }
}
