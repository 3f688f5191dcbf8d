use crate::error::{AdapterError, Result};
use crate::proto::LabelMatcher;

pub const METRIC_NAME_LABEL: &str = "__name__";
pub const FUNCTION_NAME_LABEL: &str = "functionName";
pub const TARGET_LABEL: &str = "target";
pub const TYPE_LABEL: &str = "type";

/// Backend parameters carried by a query's label matchers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedParams {
    pub metric_name: String,
    pub function_name: String,
    pub target: String,
    pub r#type: String,
}

/// Pulls the recognised parameters out of `matchers`.
///
/// Matchers are used as plain assignments: the match type is ignored and a
/// later matcher with the same name overrides an earlier one. Only
/// `functionName` is required to end up non-empty.
pub fn extract_params(matchers: &[LabelMatcher]) -> Result<ExtractedParams> {
    let mut params = ExtractedParams::default();
    for matcher in matchers {
        let slot = match matcher.name.as_str() {
            METRIC_NAME_LABEL => &mut params.metric_name,
            FUNCTION_NAME_LABEL => &mut params.function_name,
            TARGET_LABEL => &mut params.target,
            TYPE_LABEL => &mut params.r#type,
            _ => continue,
        };
        slot.clone_from(&matcher.value);
    }

    if params.function_name.is_empty() {
        return Err(AdapterError::Validation("missing function name".to_string()));
    }
    Ok(params)
}
