//! JSON model files.
//!
//! ```json
//! {
//!   "space": ["a", "b", "c"],
//!   "kind": "fraction",
//!   "model": "lowpoly",
//!   "assessments": [
//!     { "event": ["a"], "lower": "1/4" },
//!     { "gamble": [1, 0, "1/2"], "given": ["a", "c"], "upper": 0.75 },
//!     { "event": ["b"], "precise": "1/3" }
//!   ]
//! }
//! ```
//!
//! `kind` falls back to the engine configuration. `model` is `lowpoly`
//! (any gamble) or `lowprob` (unconditional lower probabilities only).

use crate::lowprev::{Algorithm, Assessment, CredalSet, LowPoly, LowPrev, LowProb};
use improb_common::{Error, Event, Gamble, Number, NumberKind, PossibilitySpace};
use improb_config::EngineConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error as ThisError;
use tracing::debug;

#[derive(ThisError, Debug)]
pub enum ModelError {
    #[error("cannot read model {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed model: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Engine(#[from] Error),
}

pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// A number written either as a JSON number or as a string like `"1/3"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberLiteral {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl NumberLiteral {
    pub fn to_number(&self, kind: NumberKind) -> improb_common::Result<Number> {
        Ok(match self {
            NumberLiteral::Integer(v) => Number::from_i64(kind, *v),
            NumberLiteral::Float(v) => Number::from_f64(kind, *v)?,
            NumberLiteral::Text(text) => Number::parse(kind, text)?,
        })
    }
}

impl fmt::Display for NumberLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberLiteral::Integer(v) => write!(f, "{}", v),
            NumberLiteral::Float(v) => write!(f, "{}", v),
            NumberLiteral::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    #[default]
    LowPoly,
    LowProb,
}

/// One assessment line: exactly one of `gamble` and `event`, and at least
/// one bound.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssessmentSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamble: Option<Vec<NumberLiteral>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<NumberLiteral>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<NumberLiteral>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precise: Option<NumberLiteral>,
}

impl AssessmentSpec {
    fn target(&self, space: &Arc<PossibilitySpace>, kind: NumberKind) -> improb_common::Result<Gamble> {
        match (&self.gamble, &self.event) {
            (Some(values), None) => {
                let values = values
                    .iter()
                    .map(|v| v.to_number(kind))
                    .collect::<improb_common::Result<Vec<_>>>()?;
                Gamble::new(space, kind, values)
            }
            (None, Some(labels)) => Ok(space.make_event(labels)?.indicator(kind)),
            _ => Err(Error::InvalidAssessment(
                "assessment needs exactly one of \"gamble\" and \"event\"".into(),
            )),
        }
    }

    fn assessment(&self, kind: NumberKind) -> improb_common::Result<Assessment> {
        let parse = |v: &Option<NumberLiteral>| v.as_ref().map(|v| v.to_number(kind)).transpose();
        if let Some(value) = parse(&self.precise)? {
            if self.lower.is_some() || self.upper.is_some() {
                return Err(Error::InvalidAssessment(
                    "\"precise\" cannot be combined with \"lower\" or \"upper\"".into(),
                ));
            }
            return Ok(Assessment::precise(value));
        }
        Ok(Assessment {
            lower: parse(&self.lower)?,
            upper: parse(&self.upper)?,
        })
    }
}

/// Deserialized model file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelFile {
    pub space: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<NumberKind>,
    #[serde(default)]
    pub model: ModelType,
    #[serde(default)]
    pub assessments: Vec<AssessmentSpec>,
}

impl ModelFile {
    pub fn from_json(content: &str) -> ModelResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_path(path: &Path) -> ModelResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Build the lower prevision. The file's `kind` overrides the one in
    /// `config`.
    pub fn build(&self, config: &EngineConfig) -> ModelResult<Model> {
        let space = PossibilitySpace::new(&self.space)?;
        let mut config = config.clone();
        if let Some(kind) = self.kind {
            config.number_kind = kind;
        }
        let kind = config.number_kind;
        let mut lowpoly = LowPoly::with_config(&space, config.clone());
        for spec in &self.assessments {
            let gamble = spec.target(&space, kind)?;
            let event = match &spec.given {
                Some(labels) => Some(space.make_event(labels)?),
                None => None,
            };
            let key = lowpoly.make_key(gamble, event.as_ref())?;
            lowpoly.insert(key, spec.assessment(kind)?)?;
        }
        debug!(
            outcomes = space.len(),
            assessments = lowpoly.len(),
            kind = %kind,
            model = ?self.model,
            "model built"
        );
        Ok(match self.model {
            ModelType::LowPoly => Model::LowPoly(lowpoly),
            ModelType::LowProb => {
                let mut lowprob = LowProb::with_config(&space, config);
                for (key, assessment) in lowpoly.iter() {
                    lowprob.insert(key.clone(), assessment.clone())?;
                }
                Model::LowProb(lowprob)
            }
        })
    }
}

/// A loaded model of either flavour.
#[derive(Debug, Clone)]
pub enum Model {
    LowPoly(LowPoly),
    LowProb(LowProb),
}

impl Model {
    pub fn load(path: &Path, config: &EngineConfig) -> ModelResult<Model> {
        ModelFile::from_path(path)?.build(config)
    }

    pub fn model_type(&self) -> ModelType {
        match self {
            Model::LowPoly(_) => ModelType::LowPoly,
            Model::LowProb(_) => ModelType::LowProb,
        }
    }

    pub fn as_lowpoly(&self) -> &LowPoly {
        match self {
            Model::LowPoly(lpr) => lpr,
            Model::LowProb(lpr) => lpr.as_lowpoly(),
        }
    }

    pub fn get_lower_with(
        &mut self,
        gamble: &Gamble,
        event: Option<&Event>,
        algorithm: Algorithm,
    ) -> improb_common::Result<Number> {
        match self {
            Model::LowPoly(lpr) => lpr.get_lower_with(gamble, event, algorithm),
            Model::LowProb(lpr) => lpr.get_lower_with(gamble, event, algorithm),
        }
    }

    pub fn get_upper_with(
        &mut self,
        gamble: &Gamble,
        event: Option<&Event>,
        algorithm: Algorithm,
    ) -> improb_common::Result<Number> {
        match self {
            Model::LowPoly(lpr) => lpr.get_upper_with(gamble, event, algorithm),
            Model::LowProb(lpr) => lpr.get_upper_with(gamble, event, algorithm),
        }
    }

    pub fn is_avoiding_sure_loss(&mut self) -> improb_common::Result<bool> {
        match self {
            Model::LowPoly(lpr) => lpr.is_avoiding_sure_loss(),
            Model::LowProb(lpr) => lpr.is_avoiding_sure_loss(),
        }
    }

    pub fn is_coherent(&mut self) -> improb_common::Result<bool> {
        match self {
            Model::LowPoly(lpr) => lpr.is_coherent(),
            Model::LowProb(lpr) => lpr.is_coherent(),
        }
    }

    pub fn is_linear(&mut self) -> improb_common::Result<bool> {
        match self {
            Model::LowPoly(lpr) => lpr.is_linear(),
            Model::LowProb(lpr) => lpr.as_lowpoly().clone().is_linear(),
        }
    }

    pub fn get_credal_set(&mut self) -> improb_common::Result<CredalSet> {
        match self {
            Model::LowPoly(lpr) => lpr.get_credal_set(),
            Model::LowProb(lpr) => lpr.as_lowpoly().clone().get_credal_set(),
        }
    }
}

impl LowPrev for Model {
    fn space(&self) -> &Arc<PossibilitySpace> {
        self.as_lowpoly().space()
    }

    fn kind(&self) -> NumberKind {
        self.as_lowpoly().kind()
    }

    fn tolerance(&self) -> f64 {
        self.as_lowpoly().config().tolerance()
    }

    fn get_lower(&mut self, gamble: &Gamble, event: Option<&Event>) -> improb_common::Result<Number> {
        self.get_lower_with(gamble, event, Algorithm::NaturalExtension)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::LowPoly(lpr) => write!(f, "{}", lpr),
            Model::LowProb(lpr) => write!(f, "{}", lpr),
        }
    }
}
