//! 函数执行结果
//! Function and pipeline results

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome of one function invocation.
///
/// A failed invocation still occupies its slot in the [`KernelResult`], with
/// `success == false` and the error message in `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionResult {
    /// Plugin of the function that produced this result
    #[serde(default)]
    pub plugin_name: String,
    /// Name of the function that produced this result
    #[serde(default)]
    pub function_name: String,
    /// 是否成功
    /// Whether the invocation succeeded
    pub success: bool,
    /// 结果文本
    /// Result text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// 错误信息
    /// Error message (when failed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 额外元数据
    /// Additional metadata
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl FunctionResult {
    /// 创建成功结果
    /// Create a successful result carrying `value`
    pub fn success(value: impl Into<String>) -> Self {
        Self {
            success: true,
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// Successful result without a value
    pub fn empty() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    /// 创建失败结果
    /// Create a failed result
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Stamp the producing function's identity onto this result
    pub fn for_function(mut self, plugin_name: impl Into<String>, function_name: impl Into<String>) -> Self {
        self.plugin_name = plugin_name.into();
        self.function_name = function_name.into();
        self
    }

    /// 添加元数据
    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Results of one pipeline run, in issuance order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelResult {
    results: Vec<FunctionResult>,
}

impl KernelResult {
    pub fn new(results: Vec<FunctionResult>) -> Self {
        Self { results }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Result in pipeline slot `index`
    pub fn get(&self, index: usize) -> Option<&FunctionResult> {
        self.results.get(index)
    }

    pub fn results(&self) -> &[FunctionResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<FunctionResult> {
        self.results
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FunctionResult> {
        self.results.iter()
    }

    /// Value of the last slot, if it succeeded with a value
    pub fn last_value(&self) -> Option<&str> {
        self.results.last().and_then(FunctionResult::value)
    }

    /// Whether every slot succeeded
    pub fn is_success(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }

    /// `(slot, error message)` for every failed slot
    pub fn errors(&self) -> Vec<(usize, &str)> {
        self.results
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.success)
            .map(|(i, r)| (i, r.error().unwrap_or_default()))
            .collect()
    }
}

impl IntoIterator for KernelResult {
    type Item = FunctionResult;
    type IntoIter = std::vec::IntoIter<FunctionResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a KernelResult {
    type Item = &'a FunctionResult;
    type IntoIter = std::slice::Iter<'a, FunctionResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_result_constructors() {
        let ok = FunctionResult::success("Paris").for_function("geo", "capital");
        assert!(ok.success);
        assert_eq!(ok.value(), Some("Paris"));
        assert_eq!(ok.plugin_name, "geo");
        assert_eq!(ok.function_name, "capital");

        let failed = FunctionResult::failure("boom").with_metadata("attempt", "1");
        assert!(!failed.success);
        assert_eq!(failed.error(), Some("boom"));
        assert_eq!(failed.metadata.get("attempt").map(String::as_str), Some("1"));

        let empty = FunctionResult::empty();
        assert!(empty.success);
        assert!(empty.value().is_none());
    }

    #[test]
    fn test_kernel_result_views() {
        let result = KernelResult::new(vec![
            FunctionResult::success("a"),
            FunctionResult::failure("timed out"),
            FunctionResult::success("c"),
        ]);

        assert_eq!(result.len(), 3);
        assert!(!result.is_success());
        assert_eq!(result.errors(), vec![(1, "timed out")]);
        assert_eq!(result.last_value(), Some("c"));
        assert_eq!(result.get(0).and_then(FunctionResult::value), Some("a"));
        assert_eq!((&result).into_iter().filter(|r| r.success).count(), 2);
    }

    #[test]
    fn test_function_result_serialization_skips_empty_fields() {
        let json = serde_json::to_value(FunctionResult::success("x")).unwrap();
        assert_eq!(json["value"], "x");
        assert!(json.get("error").is_none());
        assert!(json.get("metadata").is_none());
    }
}
