//! Validate, compile and run one submission, in that order.

use std::fmt;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::executor::Executor;
use crate::runner::{PhaseOutput, ProcessRunner, RunnerConfig};
use crate::validators::ValidationReport;

/// Position of a submission in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Built,
    Validating,
    ValidationFailed,
    Validated,
    Compiling,
    CompileFailed,
    Compiled,
    NoCompileNeeded,
    Running,
    RunFailed,
    RunSucceeded,
}

impl Stage {
    /// Whether the submission ends in this stage.
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::ValidationFailed | Self::CompileFailed | Self::RunFailed | Self::RunSucceeded
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Built => "built",
            Self::Validating => "validating",
            Self::ValidationFailed => "validation_failed",
            Self::Validated => "validated",
            Self::Compiling => "compiling",
            Self::CompileFailed => "compile_failed",
            Self::Compiled => "compiled",
            Self::NoCompileNeeded => "no_compile_needed",
            Self::Running => "running",
            Self::RunFailed => "run_failed",
            Self::RunSucceeded => "run_succeeded",
        };
        f.write_str(name)
    }
}

/// Terminal state of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    ValidationFailed { report: ValidationReport },
    CompileFailed { compile: PhaseOutput },
    RunFailed {
        compile: Option<PhaseOutput>,
        run: PhaseOutput,
    },
    RunSucceeded {
        compile: Option<PhaseOutput>,
        run: PhaseOutput,
    },
}

impl PipelineOutcome {
    pub const fn stage(&self) -> Stage {
        match self {
            Self::ValidationFailed { .. } => Stage::ValidationFailed,
            Self::CompileFailed { .. } => Stage::CompileFailed,
            Self::RunFailed { .. } => Stage::RunFailed,
            Self::RunSucceeded { .. } => Stage::RunSucceeded,
        }
    }
}

/// Drive one executor through validation, compilation and execution.
///
/// Nothing is launched when validation fails; the run phase is never
/// launched after a failed or timed-out compile. A no-op compile
/// descriptor is skipped.
#[instrument(skip_all)]
pub async fn execute<R: ProcessRunner + ?Sized>(
    executor: &Executor,
    source: &str,
    runner: &R,
    config: &RunnerConfig,
) -> Result<PipelineOutcome> {
    info!(stage = %Stage::Built, validators = executor.validators().len(), "Stage transition");
    info!(stage = %Stage::Validating, "Stage transition");
    let report = executor.validate(source);
    if !report.is_ok() {
        warn!(stage = %Stage::ValidationFailed, failures = report.failures.len(), "Stage transition");
        return Ok(PipelineOutcome::ValidationFailed { report });
    }
    info!(stage = %Stage::Validated, "Stage transition");

    let compile_descriptor = executor.compile();
    let compile = if compile_descriptor.is_noop() {
        info!(stage = %Stage::NoCompileNeeded, "Stage transition");
        None
    } else {
        info!(stage = %Stage::Compiling, command = %compile_descriptor.display_line(), "Stage transition");
        let output = runner
            .launch(&compile_descriptor, config.compile_timeout)
            .await?;
        if !output.succeeded() {
            warn!(
                stage = %Stage::CompileFailed,
                exit_code = output.exit_code,
                timed_out = output.timed_out,
                "Stage transition"
            );
            return Ok(PipelineOutcome::CompileFailed { compile: output });
        }
        info!(stage = %Stage::Compiled, "Stage transition");
        Some(output)
    };

    let run_descriptor = executor.run();
    info!(stage = %Stage::Running, command = %run_descriptor.display_line(), "Stage transition");
    let run = runner.launch(&run_descriptor, config.run_timeout).await?;

    if run.succeeded() {
        info!(stage = %Stage::RunSucceeded, "Stage transition");
        Ok(PipelineOutcome::RunSucceeded { compile, run })
    } else {
        warn!(
            stage = %Stage::RunFailed,
            exit_code = run.exit_code,
            timed_out = run.timed_out,
            "Stage transition"
        );
        Ok(PipelineOutcome::RunFailed { compile, run })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::command::ProcessDescriptor;
    use crate::config::ToolchainConfig;
    use crate::executor::ExecutorBuilder;
    use crate::sdk::Sdk;
    use crate::toolchain::Toolchain;
    use crate::validators::{self, Validator};

    /// Records launches and answers with scripted outputs, in order.
    #[derive(Default)]
    struct MockRunner {
        launched: Mutex<Vec<(ProcessDescriptor, Duration)>>,
        outputs: Mutex<Vec<PhaseOutput>>,
    }

    impl MockRunner {
        fn with_outputs(outputs: Vec<PhaseOutput>) -> Self {
            Self {
                launched: Mutex::new(Vec::new()),
                outputs: Mutex::new(outputs),
            }
        }

        fn launched(&self) -> Vec<(ProcessDescriptor, Duration)> {
            self.launched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProcessRunner for MockRunner {
        async fn launch(
            &self,
            descriptor: &ProcessDescriptor,
            timeout: Duration,
        ) -> Result<PhaseOutput> {
            self.launched
                .lock()
                .unwrap()
                .push((descriptor.clone(), timeout));
            let mut outputs = self.outputs.lock().unwrap();
            anyhow::ensure!(!outputs.is_empty(), "unexpected launch");
            Ok(outputs.remove(0))
        }
    }

    fn ok(stdout: &str) -> PhaseOutput {
        PhaseOutput {
            stdout: stdout.into(),
            ..PhaseOutput::default()
        }
    }

    fn java_executor(validators: Vec<Validator>) -> Executor {
        let toolchain = Toolchain::new(
            Sdk::Java,
            Arc::new(ToolchainConfig {
                compile_command: "javac".into(),
                run_command: "java".into(),
                compile_args: vec!["-d".into(), "bin".into()],
                run_args: vec!["-cp".into(), "bin".into()],
                ..ToolchainConfig::default()
            }),
        );
        ExecutorBuilder::new(toolchain, "/work", "HelloWorld.java", validators)
            .main_entry("HelloWorld")
            .build()
            .unwrap()
    }

    fn python_executor() -> Executor {
        let toolchain = Toolchain::new(
            Sdk::Python,
            Arc::new(ToolchainConfig {
                run_command: "python3".into(),
                ..ToolchainConfig::default()
            }),
        );
        ExecutorBuilder::new(toolchain, "/work", "main.py", validators::for_sdk(Sdk::Python))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn compiles_then_runs() {
        let runner = MockRunner::with_outputs(vec![ok(""), ok("Hello World!\n")]);
        let config = RunnerConfig::default();
        let executor = java_executor(Vec::new());

        let outcome = execute(&executor, "class HelloWorld {}", &runner, &config)
            .await
            .unwrap();

        assert_eq!(outcome.stage(), Stage::RunSucceeded);
        let launched = runner.launched();
        assert_eq!(launched.len(), 2);
        assert_eq!(launched[0].0, executor.compile());
        assert_eq!(launched[0].1, config.compile_timeout);
        assert_eq!(launched[1].0, executor.run());
        assert_eq!(launched[1].1, config.run_timeout);
        if let PipelineOutcome::RunSucceeded { compile, run } = outcome {
            assert!(compile.is_some());
            assert_eq!(run.stdout, "Hello World!\n");
        }
    }

    #[tokio::test]
    async fn validation_failure_launches_nothing() {
        let runner = MockRunner::default();
        let executor = java_executor(validators::for_sdk(Sdk::Java));

        let outcome = execute(&executor, "", &runner, &RunnerConfig::default())
            .await
            .unwrap();

        assert_eq!(outcome.stage(), Stage::ValidationFailed);
        assert!(runner.launched().is_empty());
        if let PipelineOutcome::ValidationFailed { report } = outcome {
            assert_eq!(report.failures.len(), 2);
        }
    }

    #[tokio::test]
    async fn compile_failure_prevents_run() {
        let failed = PhaseOutput {
            exit_code: 1,
            stderr: "error: ';' expected".into(),
            ..PhaseOutput::default()
        };
        let runner = MockRunner::with_outputs(vec![failed.clone(), ok("never")]);
        let executor = java_executor(Vec::new());

        let outcome = execute(&executor, "class X {", &runner, &RunnerConfig::default())
            .await
            .unwrap();

        assert_eq!(outcome, PipelineOutcome::CompileFailed { compile: failed });
        assert_eq!(runner.launched().len(), 1);
    }

    #[tokio::test]
    async fn compile_timeout_prevents_run() {
        let timed_out = PhaseOutput {
            exit_code: -1,
            timed_out: true,
            ..PhaseOutput::default()
        };
        let runner = MockRunner::with_outputs(vec![timed_out]);
        let executor = java_executor(Vec::new());

        let outcome = execute(&executor, "class X {}", &runner, &RunnerConfig::default())
            .await
            .unwrap();

        assert_eq!(outcome.stage(), Stage::CompileFailed);
        assert_eq!(runner.launched().len(), 1);
    }

    #[tokio::test]
    async fn interpreted_skips_compile() {
        let runner = MockRunner::with_outputs(vec![ok("1\n")]);
        let executor = python_executor();

        let outcome = execute(&executor, "print(1)", &runner, &RunnerConfig::default())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            PipelineOutcome::RunSucceeded {
                compile: None,
                run: ok("1\n"),
            }
        );
        let launched = runner.launched();
        assert_eq!(launched.len(), 1);
        assert_eq!(launched[0].0.executable, "python3");
    }

    #[tokio::test]
    async fn run_failure_is_reported() {
        let crashed = PhaseOutput {
            exit_code: 2,
            stderr: "Traceback".into(),
            ..PhaseOutput::default()
        };
        let runner = MockRunner::with_outputs(vec![crashed]);
        let executor = python_executor();

        let outcome = execute(&executor, "raise SystemExit(2)", &runner, &RunnerConfig::default())
            .await
            .unwrap();

        assert_eq!(outcome.stage(), Stage::RunFailed);
    }

    #[tokio::test]
    async fn runner_errors_propagate() {
        let runner = MockRunner::default();
        let executor = python_executor();

        let result = execute(&executor, "print(1)", &runner, &RunnerConfig::default()).await;
        assert!(result.is_err());
    }

    #[test]
    fn only_outcome_stages_are_terminal() {
        assert!(!Stage::Built.is_terminal());
        assert_eq!(Stage::Built.to_string(), "built");
        for stage in [Stage::Validating, Stage::Validated, Stage::Compiling, Stage::Compiled, Stage::NoCompileNeeded, Stage::Running] {
            assert!(!stage.is_terminal(), "{stage}");
        }
        let outcomes = [
            PipelineOutcome::ValidationFailed { report: ValidationReport::default() },
            PipelineOutcome::CompileFailed { compile: PhaseOutput::default() },
            PipelineOutcome::RunFailed { compile: None, run: PhaseOutput::default() },
            PipelineOutcome::RunSucceeded { compile: None, run: PhaseOutput::default() },
        ];
        for outcome in outcomes {
            assert!(outcome.stage().is_terminal());
        }
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let outcome = PipelineOutcome::CompileFailed {
            compile: PhaseOutput::default(),
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"status\":\"compile_failed\""));
        assert_eq!(Stage::NoCompileNeeded.to_string(), "no_compile_needed");
    }
}
