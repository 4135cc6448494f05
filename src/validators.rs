//! Validators that gate execution.
//!
//! A validator is a named, pure check over the submitted source and its
//! path. Validators never touch the filesystem and never run the code.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::sdk::Sdk;
use crate::source;

/// Largest accepted submission, in bytes.
pub const MAX_SOURCE_BYTES: usize = 1024 * 1024;

type CheckFn = dyn Fn(&str, &str) -> Result<(), String> + Send + Sync;

/// A named check over `(source, file_path)`.
///
/// The check returns `Err(diagnostic)` on failure.
#[derive(Clone)]
pub struct Validator {
    name: String,
    check: Arc<CheckFn>,
}

impl Validator {
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&str, &str) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn check(&self, source: &str, file_path: &str) -> Result<(), String> {
        (self.check)(source, file_path)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator").field("name", &self.name).finish_non_exhaustive()
    }
}

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub validator: String,
    pub diagnostic: String,
}

/// Outcome of running every validator of a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub failures: Vec<ValidationFailure>,
}

impl ValidationReport {
    /// Run all validators in order, collecting every failure.
    pub fn run(validators: &[Validator], source: &str, file_path: &str) -> Self {
        let failures = validators
            .iter()
            .filter_map(|validator| {
                validator
                    .check(source, file_path)
                    .err()
                    .map(|diagnostic| ValidationFailure {
                        validator: validator.name().to_string(),
                        diagnostic,
                    })
            })
            .collect();
        Self { failures }
    }

    /// True iff every validator passed.
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Default validators for an SDK, in evaluation order.
pub fn for_sdk(sdk: Sdk) -> Vec<Validator> {
    let mut validators = vec![non_empty(), max_size(MAX_SOURCE_BYTES)];
    match sdk {
        Sdk::Java => {
            validators.push(file_extension(".java"));
            validators.push(java_main_method());
        }
        Sdk::Go => {
            validators.push(file_extension(".go"));
            validators.push(go_main_package());
        }
        Sdk::Python => validators.push(file_extension(".py")),
        Sdk::Scio => validators.push(file_extension(".scala")),
    }
    validators
}

/// Rejects sources that are empty or only whitespace.
pub fn non_empty() -> Validator {
    Validator::new("non_empty", |source, _| {
        if source.trim().is_empty() {
            Err("source is empty".to_string())
        } else {
            Ok(())
        }
    })
}

/// Rejects sources larger than `limit` bytes.
pub fn max_size(limit: usize) -> Validator {
    Validator::new("max_size", move |source, _| {
        if source.len() > limit {
            Err(format!("source is {} bytes, limit is {limit}", source.len()))
        } else {
            Ok(())
        }
    })
}

/// Requires the file path to end with `ext` (e.g. `.java`).
pub fn file_extension(ext: &'static str) -> Validator {
    Validator::new("file_extension", move |_, file_path| {
        if file_path.ends_with(ext) {
            Ok(())
        } else {
            Err(format!("'{file_path}' does not have the {ext} extension"))
        }
    })
}

pub fn java_main_method() -> Validator {
    Validator::new("java_main_method", |code, _| {
        if source::declares_java_main(code) {
            Ok(())
        } else {
            Err("no `public static void main` method found".to_string())
        }
    })
}

pub fn go_main_package() -> Validator {
    Validator::new("go_main_package", |source, _| {
        let has_package = source
            .lines()
            .any(|line| line.trim() == "package main");
        if !has_package {
            return Err("source is not in `package main`".to_string());
        }
        if source.contains("func main()") {
            Ok(())
        } else {
            Err("no `func main()` found".to_string())
        }
    })
}
