use cyclic_evo_core::{run, SimConfig};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

/// Minimal PyO3 module exposing cyclic-evo-core to Python.
#[pyfunction]
fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[pyfunction]
fn default_config_json() -> PyResult<String> {
    serde_json::to_string(&SimConfig::default())
        .map_err(|e| PyValueError::new_err(format!("failed to serialize default config: {e}")))
}

#[pyfunction]
fn validate_config_json(config_json: &str) -> PyResult<bool> {
    parse_config(config_json)
        .map(|_| true)
        .map_err(PyValueError::new_err)
}

/// Run to completion and return the per-day summary as JSON.
#[pyfunction]
fn run_summary_json(config_json: &str) -> PyResult<String> {
    let config = parse_config(config_json).map_err(PyValueError::new_err)?;
    summary_json(config).map_err(PyValueError::new_err)
}

/// Run to completion and return summary, registry and day lists as JSON.
#[pyfunction]
fn run_record_json(config_json: &str) -> PyResult<String> {
    let config = parse_config(config_json).map_err(PyValueError::new_err)?;
    record_json(config).map_err(PyValueError::new_err)
}

fn parse_config(config_json: &str) -> Result<SimConfig, String> {
    let config = SimConfig::from_json_str(config_json)
        .map_err(|e| format!("invalid config json: {e}"))?;
    config
        .validate()
        .map_err(|e| format!("invalid simulation configuration: {e}"))?;
    Ok(config)
}

fn summary_json(config: SimConfig) -> Result<String, String> {
    let record = run(config).map_err(|e| format!("simulation failed: {e}"))?;
    serde_json::to_string(&record.summary).map_err(|e| format!("failed to serialize summary: {e}"))
}

fn record_json(config: SimConfig) -> Result<String, String> {
    let record = run(config).map_err(|e| format!("simulation failed: {e}"))?;
    serde_json::to_string(&record).map_err(|e| format!("failed to serialize record: {e}"))
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add_function(wrap_pyfunction!(default_config_json, m)?)?;
    m.add_function(wrap_pyfunction!(validate_config_json, m)?)?;
    m.add_function(wrap_pyfunction!(run_summary_json, m)?)?;
    m.add_function(wrap_pyfunction!(run_record_json, m)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyclic_evo_core::{RunRecord, RunSummary};

    #[test]
    fn parse_config_accepts_default() {
        let json = serde_json::to_string(&SimConfig::default()).unwrap();
        assert_eq!(parse_config(&json).unwrap(), SimConfig::default());
    }

    #[test]
    fn parse_config_fills_missing_fields() {
        let config = parse_config(r#"{"num_days": 3}"#).unwrap();
        assert_eq!(config.num_days, 3);
        assert_eq!(config.num_options, 3);
    }

    #[test]
    fn parse_config_rejects_bad_json() {
        let err = parse_config("{not json").unwrap_err();
        assert!(err.starts_with("invalid config json"));
    }

    #[test]
    fn parse_config_rejects_invalid_values() {
        let err = parse_config(r#"{"num_options": 1}"#).unwrap_err();
        assert!(err.starts_with("invalid simulation configuration"));
    }

    #[test]
    fn summary_json_round_trips() {
        let config = SimConfig {
            num_days: 4,
            ..SimConfig::default()
        };
        let summary: RunSummary = serde_json::from_str(&summary_json(config).unwrap()).unwrap();
        assert_eq!(summary.days.len(), 5);
        assert_eq!(summary.seed, 42);
    }

    #[test]
    fn record_json_includes_registry() {
        let config = SimConfig {
            num_days: 2,
            ..SimConfig::default()
        };
        let record: RunRecord = serde_json::from_str(&record_json(config).unwrap()).unwrap();
        let total: usize = record.populations.iter().map(Vec::len).sum();
        assert_eq!(record.registry.len(), total);
    }
}
