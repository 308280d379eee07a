//! Local execution of the built-in tools: shell, read, ls, grep/glob,
//! write, request-context. Every handler returns a ready-to-append
//! `ExecClientMessage` whose result variant field number mirrors the
//! request's, per the wire contract.

use std::path::Path;
use std::time::Instant;

use bridge_protocol::EnvDescriptor;
use bridge_protocol::ExecClientMessage;
use bridge_protocol::ExecRequest;
use bridge_protocol::ExecResultKind;
use bridge_wire::encode_bool_field;
use bridge_wire::encode_bytes_field;
use bridge_wire::encode_string_field;
use bridge_wire::encode_varint_field;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

/// Matches the teacher's per-stream cap: keeps a single runaway command
/// from blowing up memory or the outgoing append.
const MAX_STREAM_OUTPUT_BYTES: usize = 10 * 1024;

async fn read_capped<R: tokio::io::AsyncRead + Unpin>(mut reader: R) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                if buf.len() < MAX_STREAM_OUTPUT_BYTES {
                    let remaining = MAX_STREAM_OUTPUT_BYTES - buf.len();
                    buf.extend_from_slice(&chunk[..n.min(remaining)]);
                }
            }
            Err(_) => break,
        }
    }
    buf
}

fn encode_shell_success(stdout: &str, stderr: &str, exit_code: i32, duration_ms: u64) -> Vec<u8> {
    let mut success = Vec::new();
    encode_string_field(1, stdout, &mut success);
    encode_string_field(2, stderr, &mut success);
    encode_varint_field(3, exit_code as u64, &mut success);
    encode_varint_field(4, duration_ms, &mut success);
    let mut body = Vec::new();
    encode_bytes_field(1, &success, &mut body);
    body
}

fn encode_shell_error(message: &str) -> Vec<u8> {
    let mut error = Vec::new();
    encode_string_field(1, message, &mut error);
    let mut body = Vec::new();
    encode_bytes_field(2, &error, &mut body);
    body
}

pub async fn handle_shell(id: u32, command: &str, cwd: Option<&str>) -> ExecClientMessage {
    let start = Instant::now();
    let mut cmd = Command::new("/bin/sh");
    cmd.arg("-c").arg(command);
    if let Some(cwd) = cwd {
        cmd.current_dir(cwd);
    }
    cmd.stdout(std::process::Stdio::piped());
    cmd.stderr(std::process::Stdio::piped());

    let result_body = match cmd.spawn() {
        Ok(mut child) => {
            let stdout = child.stdout.take();
            let stderr = child.stderr.take();
            let stdout_bytes = if let Some(s) = stdout { read_capped(s).await } else { Vec::new() };
            let stderr_bytes = if let Some(s) = stderr { read_capped(s).await } else { Vec::new() };
            match child.wait().await {
                Ok(status) => encode_shell_success(
                    &String::from_utf8_lossy(&stdout_bytes),
                    &String::from_utf8_lossy(&stderr_bytes),
                    status.code().unwrap_or(-1),
                    start.elapsed().as_millis() as u64,
                ),
                Err(err) => encode_shell_error(&err.to_string()),
            }
        }
        Err(err) => encode_shell_error(&err.to_string()),
    };

    ExecClientMessage {
        id,
        exec_id: None,
        result_kind: ExecResultKind::Shell,
        result_body,
    }
}

fn encode_read_success(content: &str, line_count: u64, file_size: u64, truncated: bool) -> Vec<u8> {
    let mut success = Vec::new();
    encode_string_field(1, content, &mut success);
    encode_varint_field(2, line_count, &mut success);
    encode_varint_field(3, file_size, &mut success);
    encode_bool_field(4, truncated, &mut success);
    let mut body = Vec::new();
    encode_bytes_field(1, &success, &mut body);
    body
}

fn encode_read_error(path: &str, message: &str) -> Vec<u8> {
    let mut error = Vec::new();
    encode_string_field(1, path, &mut error);
    encode_string_field(2, message, &mut error);
    let mut body = Vec::new();
    encode_bytes_field(2, &error, &mut body);
    body
}

pub async fn handle_read(id: u32, path: &str) -> ExecClientMessage {
    let result_body = match tokio::fs::read_to_string(path).await {
        Ok(content) => {
            let line_count = content.lines().count() as u64;
            let file_size = content.len() as u64;
            encode_read_success(&content, line_count, file_size, false)
        }
        Err(err) => encode_read_error(path, &err.to_string()),
    };

    ExecClientMessage {
        id,
        exec_id: None,
        result_kind: ExecResultKind::Read,
        result_body,
    }
}

pub async fn handle_ls(id: u32, path: &str) -> ExecClientMessage {
    let listing = match tokio::fs::read_dir(path).await {
        Ok(mut dir) => {
            let mut entries = Vec::new();
            while let Ok(Some(entry)) = dir.next_entry().await {
                let name = entry.file_name().to_string_lossy().into_owned();
                let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
                entries.push(if is_dir { format!("{name}/") } else { name });
            }
            entries.sort();
            entries.join("\n")
        }
        Err(err) => format!("error: {err}"),
    };

    let mut body = Vec::new();
    encode_string_field(1, &listing, &mut body);
    ExecClientMessage {
        id,
        exec_id: None,
        result_kind: ExecResultKind::Ls,
        result_body: body,
    }
}

/// Whether a grep request matches filenames against a glob pattern or
/// searches file contents for a substring. A vendor request carries exactly
/// one of these, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrepMode<'a> {
    Glob(&'a str),
    Content(&'a str),
}

pub async fn handle_grep(id: u32, mode: GrepMode<'_>, search_root: &str) -> ExecClientMessage {
    let glob_pattern = match mode {
        GrepMode::Glob(pattern) => glob::Pattern::new(pattern).ok(),
        GrepMode::Content(_) => None,
    };

    let mut matches = Vec::new();
    let mut stack = vec![Path::new(search_root).to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(mut entries) = tokio::fs::read_dir(&dir).await else { continue };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
                stack.push(path);
                continue;
            }
            match (mode, &glob_pattern) {
                (GrepMode::Glob(_), Some(glob_pattern)) => {
                    if glob_pattern.matches_path(&path) {
                        matches.push(path.to_string_lossy().into_owned());
                    }
                }
                (GrepMode::Content(pattern), _) => {
                    if let Ok(content) = tokio::fs::read_to_string(&path).await {
                        if content.contains(pattern) {
                            matches.push(path.to_string_lossy().into_owned());
                        }
                    }
                }
                _ => {}
            }
        }
        if matches.len() >= 200 {
            break;
        }
    }

    let mut body = Vec::new();
    for m in &matches {
        encode_string_field(1, m, &mut body);
    }
    encode_varint_field(2, matches.len() as u64, &mut body);

    ExecClientMessage {
        id,
        exec_id: None,
        result_kind: ExecResultKind::Grep,
        result_body: body,
    }
}

pub async fn handle_write(id: u32, path: &str, content: &str, echo_content: bool) -> ExecClientMessage {
    let result_body = match write_with_parents(path, content).await {
        Ok(()) => {
            let mut body = Vec::new();
            encode_string_field(1, path, &mut body);
            encode_varint_field(2, content.lines().count() as u64, &mut body);
            encode_varint_field(3, content.len() as u64, &mut body);
            if echo_content {
                encode_string_field(4, content, &mut body);
            }
            body
        }
        Err(err) => {
            let mut body = Vec::new();
            encode_string_field(1, path, &mut body);
            encode_string_field(2, &err.to_string(), &mut body);
            body
        }
    };

    ExecClientMessage {
        id,
        exec_id: None,
        result_kind: ExecResultKind::Write,
        result_body,
    }
}

async fn write_with_parents(path: &str, content: &str) -> std::io::Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, content).await
}

pub fn handle_request_context(id: u32, env: &EnvDescriptor) -> ExecClientMessage {
    ExecClientMessage {
        id,
        exec_id: None,
        result_kind: ExecResultKind::RequestContext,
        result_body: env.encode(),
    }
}

/// The process-wide environment descriptor the vendor asks for via
/// `request_context`. Cheap to recompute per session; nothing here is
/// cached or mutated.
pub fn current_env_descriptor(workspace_path: &str) -> EnvDescriptor {
    EnvDescriptor {
        os_version: std::env::consts::OS.to_string(),
        workspace_path: workspace_path.to_string(),
        shell: std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string()),
        timezone: std::env::var("TZ").unwrap_or_else(|_| "UTC".to_string()),
        project_folder: workspace_path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[tokio::test]
    async fn shell_success_reports_exit_code_and_stdout() {
        let msg = handle_shell(1, "echo hi", None).await;
        assert_eq!(msg.id, 1);
        assert_eq!(msg.result_kind, ExecResultKind::Shell);
        let fields = bridge_wire::decode_fields(&msg.result_body).unwrap();
        assert_eq!(fields[0].0, 1); // success branch
    }

    #[tokio::test]
    async fn read_missing_file_reports_error_branch() {
        let msg = handle_read(1, "/does/not/exist/at/all").await;
        let fields = bridge_wire::decode_fields(&msg.result_body).unwrap();
        assert_eq!(fields[0].0, 2); // error branch
    }

    #[tokio::test]
    async fn glob_mode_matches_filenames_not_content() {
        let dir = std::env::temp_dir().join(format!("bridge-core-glob-test-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("a.rs"), "needle").await.unwrap();
        tokio::fs::write(dir.join("b.txt"), "needle").await.unwrap();

        let msg = handle_grep(1, GrepMode::Glob("*.rs"), dir.to_str().unwrap()).await;
        let fields = bridge_wire::decode_fields(&msg.result_body).unwrap();
        let count = fields
            .iter()
            .find(|(n, _)| *n == 2)
            .and_then(|(_, v)| v.as_u64())
            .unwrap();
        assert_eq!(count, 1);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn write_then_read_round_trips_content() {
        let dir = std::env::temp_dir().join(format!("bridge-core-test-{}", std::process::id()));
        let file = dir.join("out.txt");
        let write_msg = handle_write(1, file.to_str().unwrap(), "hello", false).await;
        assert_eq!(write_msg.result_kind, ExecResultKind::Write);

        let read_msg = handle_read(2, file.to_str().unwrap()).await;
        let fields = bridge_wire::decode_fields(&read_msg.result_body).unwrap();
        assert_eq!(fields[0].0, 1);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
