use derive_more::Display;
use std::error::Error;

pub type GenericError = Box<dyn Error + Send + Sync>;
pub type GResult<T> = Result<T, GenericError>;


/* Parameter Store errors */

#[derive(Display, Debug, Clone)]
#[display(fmt = "{} already has {} set", entity, field)]
pub struct ParameterDuplicate {
  entity: String,
  field: String,
}
impl ParameterDuplicate {
  pub fn boxed(entity: impl Into<String>, field: impl Into<String>) -> GenericError {
    Box::new(ParameterDuplicate { entity: entity.into(), field: field.into() })
  }
}
impl Error for ParameterDuplicate {}


#[derive(Display, Debug, Clone)]
#[display(fmt = "{} is missing {}", entity, field)]
pub struct ParameterMissing {
  entity: String,
  field: String,
}
impl ParameterMissing {
  pub fn boxed(entity: impl Into<String>, field: impl Into<String>) -> GenericError {
    Box::new(ParameterMissing { entity: entity.into(), field: field.into() })
  }
}
impl Error for ParameterMissing {}


#[derive(Display, Debug, Clone)]
#[display(fmt = "unknown data center {}", name)]
pub struct UnknownDc {
  name: String,
}
impl UnknownDc {
  pub fn boxed(name: impl Into<String>) -> GenericError {
    Box::new(UnknownDc { name: name.into() })
  }
}
impl Error for UnknownDc {}


#[derive(Display, Debug, Clone)]
#[display(fmt = "unknown storage tier {} at data center {}", tier, dc)]
pub struct UnknownTier {
  dc: String,
  tier: String,
}
impl UnknownTier {
  pub fn boxed(dc: impl Into<String>, tier: impl Into<String>) -> GenericError {
    Box::new(UnknownTier { dc: dc.into(), tier: tier.into() })
  }
}
impl Error for UnknownTier {}


/* CLI / configuration errors */

#[derive(Display, Debug, Clone)]
#[display(fmt = "invalid option {}", option)]
pub struct InvalidOption {
  option: String,
}
impl InvalidOption {
  pub fn boxed(option: impl Into<String>) -> GenericError {
    Box::new(InvalidOption { option: option.into() })
  }
}
impl Error for InvalidOption {}


#[derive(Display, Debug)]
#[display(fmt = "failed to parse {}: {}", file, source)]
pub struct JsonParseError {
  file: String,
  source: serde_json::Error,
}
impl JsonParseError {
  pub fn boxed(file: impl Into<String>, source: serde_json::Error) -> GenericError {
    Box::new(JsonParseError { file: file.into(), source })
  }
}
impl Error for JsonParseError {}


#[derive(Display, Debug, Clone)]
#[display(fmt = "{}", message)]
pub struct CliUsage {
  message: String,
}
impl CliUsage {
  pub fn boxed(message: impl Into<String>) -> GenericError {
    Box::new(CliUsage { message: message.into() })
  }
}
impl Error for CliUsage {}


/* Engine bugs: these indicate a broken invariant, not bad input */

#[derive(Display, Debug, Clone)]
#[display(fmt = "reducer invariant violated: {}", detail)]
pub struct ReducerInvariantViolation {
  detail: String,
}
impl ReducerInvariantViolation {
  pub fn boxed(detail: impl Into<String>) -> GenericError {
    Box::new(ReducerInvariantViolation { detail: detail.into() })
  }
}
impl Error for ReducerInvariantViolation {}


#[derive(Display, Debug, Clone)]
#[display(fmt = "builder invariant violated: {}", detail)]
pub struct BuilderInvariantViolation {
  detail: String,
}
impl BuilderInvariantViolation {
  pub fn boxed(detail: impl Into<String>) -> GenericError {
    Box::new(BuilderInvariantViolation { detail: detail.into() })
  }
}
impl Error for BuilderInvariantViolation {}
