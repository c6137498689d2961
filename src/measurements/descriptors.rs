use crate::tempo::endpoints::{FORECAST_24H, NOW, STATS, TARIFS, TODAY, TOMORROW, YESTERDAY};
use serde::Serialize;

pub const UNIT_EURO_PER_KWH: &str = "EUR/kWh";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Monetary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    Measurement,
}

/// Rule mapping one snapshot field to a displayed value plus attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementDescriptor {
    pub key: &'static str,
    pub name: &'static str,
    /// Endpoint name the value is read from
    pub data_key: &'static str,
    pub value_key: Option<&'static str>,
    pub attribute_keys: &'static [&'static str],
    /// Subset of `attribute_keys` rendered as strings
    pub text_attribute_keys: &'static [&'static str],
    pub is_list: bool,
    pub unit: Option<&'static str>,
    pub device_class: Option<DeviceClass>,
    pub state_class: Option<StateClass>,
}

impl MeasurementDescriptor {
    const fn tariff(key: &'static str, name: &'static str, value_key: &'static str) -> Self {
        Self {
            key,
            name,
            data_key: TARIFS,
            value_key: Some(value_key),
            attribute_keys: TARIFF_METADATA,
            text_attribute_keys: &[],
            is_list: false,
            unit: Some(UNIT_EURO_PER_KWH),
            device_class: Some(DeviceClass::Monetary),
            state_class: Some(StateClass::Measurement),
        }
    }

    const fn field(
        key: &'static str,
        name: &'static str,
        data_key: &'static str,
        value_key: &'static str,
        attribute_keys: &'static [&'static str],
    ) -> Self {
        Self {
            key,
            name,
            data_key,
            value_key: Some(value_key),
            attribute_keys,
            text_attribute_keys: &[],
            is_list: false,
            unit: None,
            device_class: None,
            state_class: None,
        }
    }

    const fn list(key: &'static str, name: &'static str, data_key: &'static str) -> Self {
        Self {
            key,
            name,
            data_key,
            value_key: None,
            attribute_keys: &[],
            text_attribute_keys: &[],
            is_list: true,
            unit: None,
            device_class: None,
            state_class: None,
        }
    }

    const fn with_text_attributes(mut self, keys: &'static [&'static str]) -> Self {
        self.text_attribute_keys = keys;
        self
    }

    /// Values are coerced to euros per kWh
    pub fn is_monetary(&self) -> bool {
        matches!(self.device_class, Some(DeviceClass::Monetary))
            && self.unit == Some(UNIT_EURO_PER_KWH)
    }
}

const TARIFF_METADATA: &[&str] = &["dateDebut", "dateFin", "dateMaj", "tarifForce", "dataGouvId"];

const DAY_ATTRIBUTES: &[&str] = &["dateJour", "codeJour", "periode"];

pub static DESCRIPTORS: &[MeasurementDescriptor] = &[
    MeasurementDescriptor::tariff("bleu_hc", "Tarif Tempo Bleu HC", "bleuHC"),
    MeasurementDescriptor::tariff("bleu_hp", "Tarif Tempo Bleu HP", "bleuHP"),
    MeasurementDescriptor::tariff("blanc_hc", "Tarif Tempo Blanc HC", "blancHC"),
    MeasurementDescriptor::tariff("blanc_hp", "Tarif Tempo Blanc HP", "blancHP"),
    MeasurementDescriptor::tariff("rouge_hc", "Tarif Tempo Rouge HC", "rougeHC"),
    MeasurementDescriptor::tariff("rouge_hp", "Tarif Tempo Rouge HP", "rougeHP"),
    MeasurementDescriptor::field(
        "now_tarif_kwh",
        "Tarif Tempo actuel",
        NOW,
        "libTarif",
        &["tarifKwh", "codeCouleur", "codeHoraire", "applicableIn"],
    )
    .with_text_attributes(&["tarifKwh"]),
    MeasurementDescriptor::field(
        "jour_tempo_today",
        "Couleur Tempo aujourd'hui",
        TODAY,
        "libCouleur",
        DAY_ATTRIBUTES,
    ),
    MeasurementDescriptor::field(
        "jour_tempo_tomorrow",
        "Couleur Tempo demain",
        TOMORROW,
        "libCouleur",
        DAY_ATTRIBUTES,
    ),
    MeasurementDescriptor::field(
        "jour_tempo_yesterday",
        "Couleur Tempo hier",
        YESTERDAY,
        "libCouleur",
        DAY_ATTRIBUTES,
    ),
    MeasurementDescriptor::field(
        "tempo_stats",
        "Statistiques Tempo",
        STATS,
        "periode",
        &[
            "bissextile",
            "dernierJourInclus",
            "joursBleusConsommes",
            "joursBlancsConsommes",
            "joursRougesConsommes",
            "joursBleusRestants",
            "joursBlancsRestants",
            "joursRougesRestants",
        ],
    ),
    MeasurementDescriptor::list("tempo_24h", "Tempo 24h", FORECAST_24H),
];

/// Look up a descriptor by key
pub fn descriptor(key: &str) -> Option<&'static MeasurementDescriptor> {
    DESCRIPTORS.iter().find(|d| d.key == key)
}
