//! Report delivery.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::core::error::{ReconcileError, ReconcileResult};
use crate::report::escape_html;

const HTML_DOCUMENT: &str = "<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"utf-8\">\n  <title>{title}</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n";

pub trait ReportSink {
    fn deliver(&self, subject: &str, body: &str) -> ReconcileResult<()>;
}

/// Wrap a report fragment into a full HTML page, one `<br/>` per line.
pub fn html_document(title: &str, fragment: &str) -> String {
    HTML_DOCUMENT
        .replace("{title}", &escape_html(title))
        .replace("{body}", &fragment.replace('\n', "<br/>\n"))
}

pub fn error_fragment(message: &str) -> String {
    format!(
        "<b><p style=\"color:red\">ES monitor error:</p></b>\n{}",
        escape_html(message)
    )
}

pub fn compose_message(hostname: &str, recipient: &str, subject: &str, html: &str) -> String {
    format!(
        "From: ES-monitor@{hostname}\nTo: {recipient}\nSubject: {subject}\nContent-Type: text/html\nMIME-Version: 1.0\n\n{html}\n"
    )
}

/// One `sendmail <recipient>` per recipient. `body` is an HTML fragment.
pub struct SendmailSink {
    program: String,
    hostname: String,
    recipients: Vec<String>,
}

impl SendmailSink {
    pub fn new(hostname: impl Into<String>, recipients: &[String]) -> Self {
        Self {
            program: "sendmail".to_string(),
            hostname: hostname.into(),
            recipients: recipients.to_vec(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn send_one(&self, recipient: &str, message: &str) -> Result<(), String> {
        let mut child = Command::new(&self.program)
            .arg(recipient)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("cannot start {}: {e}", self.program))?;

        // stdin is closed before waiting; the child is reaped even when the write fails
        let write_result = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(message.as_bytes()),
            None => Ok(()),
        };

        let output = child
            .wait_with_output()
            .map_err(|e| format!("cannot wait for {}: {e}", self.program))?;
        if let Err(e) = write_result {
            return Err(format!(
                "cannot write message: {e} ({} exited with {}: {})",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }
        if !output.status.success() {
            return Err(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }
        Ok(())
    }
}

impl ReportSink for SendmailSink {
    // every recipient is attempted; the first failure is returned afterwards
    fn deliver(&self, subject: &str, body: &str) -> ReconcileResult<()> {
        let html = html_document(subject, body);
        let mut first_failure = None;

        for recipient in &self.recipients {
            let message = compose_message(&self.hostname, recipient, subject, &html);
            match self.send_one(recipient, &message) {
                Ok(()) => tracing::info!(recipient = %recipient, "report sent"),
                Err(reason) => {
                    tracing::warn!(recipient = %recipient, "error sending report: {reason}");
                    if first_failure.is_none() {
                        first_failure = Some(ReconcileError::Delivery {
                            recipient: recipient.clone(),
                            reason,
                        });
                    }
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Prints the rendered report; used for dry runs.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl ReportSink for StdoutSink {
    fn deliver(&self, subject: &str, body: &str) -> ReconcileResult<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        writeln!(out, "{subject}\n\n{body}").map_err(|e| ReconcileError::Delivery {
            recipient: "stdout".to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_document_wraps_and_breaks_lines() {
        let doc = html_document("ES prod monitor status", "line one\nline two");

        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>ES prod monitor status</title>"));
        assert!(doc.contains("line one<br/>\nline two"));
    }

    #[test]
    fn message_headers_name_host_recipient_and_subject() {
        let msg = compose_message("mon01", "ops@example.org", "ES prod monitor status", "<p>x</p>");
        let mut lines = msg.lines();

        assert_eq!(lines.next(), Some("From: ES-monitor@mon01"));
        assert_eq!(lines.next(), Some("To: ops@example.org"));
        assert_eq!(lines.next(), Some("Subject: ES prod monitor status"));
        assert!(msg.contains("Content-Type: text/html\nMIME-Version: 1.0\n\n<p>x</p>\n"));
    }

    #[test]
    fn error_fragment_is_escaped() {
        let frag = error_fragment("duplicate slug <acme>");
        assert!(frag.contains("color:red"));
        assert!(frag.ends_with("duplicate slug &lt;acme&gt;"));
    }

    #[test]
    fn failing_transport_is_reported_per_recipient() {
        let sink = SendmailSink::new("host", &["a@example.org".to_string(), "b@example.org".to_string()])
            .with_program("/nonexistent/sendmail-for-tests");

        let err = sink.deliver("subject", "body").unwrap_err();
        match err {
            ReconcileError::Delivery { recipient, reason } => {
                assert_eq!(recipient, "a@example.org");
                assert!(reason.contains("cannot start"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[cfg(unix)]
    fn mk_script(dir: &std::path::Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-sendmail");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[test]
    fn every_recipient_is_attempted_after_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("invocations");
        let script = mk_script(
            dir.path(),
            &format!("echo \"$1\" >> '{}'\ncat > /dev/null\necho rejected >&2\nexit 1", log.display()),
        );
        let sink = SendmailSink::new("host", &["a@example.org".to_string(), "b@example.org".to_string()])
            .with_program(script);

        let err = sink.deliver("subject", "body").unwrap_err();

        assert!(matches!(err, ReconcileError::Delivery { ref recipient, ref reason }
            if recipient == "a@example.org" && reason.contains("rejected")));
        let invoked = std::fs::read_to_string(&log).unwrap();
        assert_eq!(invoked.lines().collect::<Vec<_>>(), vec!["a@example.org", "b@example.org"]);
    }

    #[cfg(unix)]
    #[test]
    fn message_reaches_the_program_on_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("message");
        let script = mk_script(dir.path(), &format!("cat > '{}'", out.display()));
        let sink = SendmailSink::new("mon01", &["ops@example.org".to_string()]).with_program(script);

        sink.deliver("ES prod monitor status", "missing 1 indices").unwrap();

        let message = std::fs::read_to_string(&out).unwrap();
        assert!(message.starts_with("From: ES-monitor@mon01\nTo: ops@example.org\n"));
        assert!(message.contains("missing 1 indices"));
    }

    ///a program that exits without reading stdin still gets waited on
    #[cfg(unix)]
    #[test]
    fn broken_pipe_still_collects_exit_status() {
        let sink = SendmailSink::new("host", &["a@example.org".to_string()]).with_program("true");
        let body = "x".repeat(4 * 1024 * 1024);

        let err = sink.deliver("subject", &body).unwrap_err();

        match err {
            ReconcileError::Delivery { reason, .. } => {
                assert!(reason.contains("cannot write message"), "{reason}");
                assert!(reason.contains("exited with"), "{reason}");
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
