use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

use super::coordinator::{AppInvoker, InstalledApps, LaunchError};
use crate::shared::config::SurveyConfig;

/// Survey как внешний исполняемый файл
///
/// Приложение считается установленным, если исполняемый файл найден по пути
/// или в `PATH`. Запуск не ждёт завершения процесса: его дожидается
/// фоновый поток.
#[derive(Debug, Clone)]
pub struct ProcessAppHost {
    package_name: String,
    executable: String,
}

impl ProcessAppHost {
    pub fn new(package_name: impl Into<String>, executable: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            executable: executable.into(),
        }
    }

    pub fn from_config(config: &SurveyConfig) -> Self {
        Self::new(config.package_name.clone(), config.executable.clone())
    }

    fn resolve_executable(&self) -> Option<PathBuf> {
        let direct = Path::new(&self.executable);
        if direct.components().count() > 1 || direct.is_absolute() {
            return direct.is_file().then(|| direct.to_path_buf());
        }
        let search_path = std::env::var_os("PATH")?;
        std::env::split_paths(&search_path)
            .flat_map(|dir| executable_candidates(&dir, &self.executable))
            .find(|candidate| candidate.is_file())
    }
}

fn executable_candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    if cfg!(windows) {
        vec![dir.join(name), dir.join(format!("{}.exe", name))]
    } else {
        vec![dir.join(name)]
    }
}

impl InstalledApps for ProcessAppHost {
    fn is_installed(&self, package_name: &str) -> bool {
        if package_name != self.package_name {
            tracing::debug!(
                "Package {} is not served by this host ({})",
                package_name,
                self.package_name
            );
            return false;
        }
        self.resolve_executable().is_some()
    }
}

impl AppInvoker for ProcessAppHost {
    fn invoke(&self, address: &str, request_code: i32) -> Result<(), LaunchError> {
        let failed = |reason: String| LaunchError::InvocationFailed {
            target: self.executable.clone(),
            reason,
        };
        let executable = self
            .resolve_executable()
            .ok_or_else(|| failed("executable not found".to_string()))?;

        let child = Command::new(&executable)
            .arg("--request-code")
            .arg(request_code.to_string())
            .arg(address)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| failed(e.to_string()))?;

        tracing::info!(
            "Started {} (pid {}) with request code {}",
            executable.display(),
            child.id(),
            request_code
        );
        if let Err(e) = reap_in_background(child) {
            tracing::warn!("Survey process started but will not be reaped: {}", e);
        }
        Ok(())
    }
}

/// Дождаться завершения процесса в отдельном потоке, чтобы не оставлять зомби
fn reap_in_background(mut child: Child) -> std::io::Result<JoinHandle<Option<ExitStatus>>> {
    thread::Builder::new()
        .name("survey-reaper".to_string())
        .spawn(move || {
            let pid = child.id();
            match child.wait() {
                Ok(status) => {
                    tracing::debug!("Survey process {} exited with {}", pid, status);
                    Some(status)
                }
                Err(e) => {
                    tracing::warn!("Failed to wait for Survey process {}: {}", pid, e);
                    None
                }
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_executable_counts_as_installed() {
        let exe = std::env::current_exe().unwrap();
        let host = ProcessAppHost::new("org.opendatakit.survey", exe.to_string_lossy());
        assert!(host.is_installed("org.opendatakit.survey"));
        assert!(!host.is_installed("org.opendatakit.services"));
    }

    #[test]
    fn test_missing_executable_is_not_installed() {
        let host = ProcessAppHost::new(
            "org.opendatakit.survey",
            "/nonexistent/dir/odk-survey-binary",
        );
        assert!(!host.is_installed("org.opendatakit.survey"));
        assert!(host.invoke("content://x", 4).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_finished_child_is_reaped() {
        let child = Command::new("true").spawn().unwrap();
        let status = reap_in_background(child).unwrap().join().unwrap();
        assert!(status.unwrap().success());
    }

    #[cfg(unix)]
    #[test]
    fn test_invoke_starts_resolved_executable() {
        let host = ProcessAppHost::new("org.opendatakit.survey", "true");
        assert!(host.is_installed("org.opendatakit.survey"));
        assert!(host.invoke("content://x", 4).is_ok());
    }

    #[test]
    fn test_bare_name_not_on_path_is_not_installed() {
        let host = ProcessAppHost::new("org.opendatakit.survey", "odk-survey-definitely-absent");
        assert!(!host.is_installed("org.opendatakit.survey"));
    }
}
