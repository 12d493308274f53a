//! Agent runtime backed by the Claude Code CLI.
//!
//! The CLI runs in print mode with `--output-format stream-json`, one JSON
//! object per stdout line. Assistant text blocks become
//! [`ReplyFragment::Text`] and the final `result` line becomes
//! [`ReplyFragment::Result`]. The only tool server handed to the agent is the
//! database MCP server, and tool use is restricted to its namespace.

use std::collections::{BTreeMap, VecDeque};
use std::process::Stdio;

use async_trait::async_trait;
use realstate_core::Settings;
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tracing::{debug, info, trace, warn};

use crate::error::{AgentError, Result};
use crate::runtime::{AgentRequest, AgentRuntime, ReplyFragment, ReplyStream};

/// Name of the database MCP server inside the agent.
pub const MCP_SERVER_NAME: &str = "supabase";

/// Tool namespace the agent may use.
pub const ALLOWED_TOOLS: &str = "mcp__supabase__*";

/// Permission mode: tool calls are accepted without interactive prompts.
const PERMISSION_MODE: &str = "acceptEdits";

/// A stdio MCP server launched by the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct McpServer {
    pub command: String,
    pub args: Vec<String>,
}

impl McpServer {
    /// The Supabase MCP server for one project.
    pub fn supabase(project_ref: &str, access_token: &str) -> Self {
        Self {
            command: "npx".to_string(),
            args: vec![
                "-y".to_string(),
                "@supabase/mcp-server-supabase@latest".to_string(),
                "--project-ref".to_string(),
                project_ref.to_string(),
                "--access-token".to_string(),
                access_token.to_string(),
            ],
        }
    }
}

#[derive(Serialize)]
struct McpConfig<'a> {
    #[serde(rename = "mcpServers")]
    mcp_servers: BTreeMap<&'a str, &'a McpServer>,
}

/// Spawns the agent CLI once per message.
#[derive(Debug, Clone)]
pub struct ClaudeCliRuntime {
    program: String,
    leading_args: Vec<String>,
    model: String,
    mcp_server: McpServer,
}

impl ClaudeCliRuntime {
    /// Create a runtime.
    ///
    /// `command_line` is split on whitespace; the first word is the
    /// executable and the rest are passed before the generated arguments.
    pub fn new(command_line: &str, model: impl Into<String>, mcp_server: McpServer) -> Self {
        let mut words = command_line.split_whitespace().map(String::from);
        let program = words
            .next()
            .unwrap_or_else(|| realstate_core::config::DEFAULT_AGENT_COMMAND.to_string());
        Self {
            program,
            leading_args: words.collect(),
            model: model.into(),
            mcp_server,
        }
    }

    /// Build the runtime from application settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            &settings.agent_command,
            settings.agent_model.clone(),
            McpServer::supabase(&settings.supabase_project_ref, &settings.supabase_access_token),
        )
    }

    fn mcp_config_json(&self) -> Result<String> {
        let config = McpConfig {
            mcp_servers: BTreeMap::from([(MCP_SERVER_NAME, &self.mcp_server)]),
        };
        Ok(serde_json::to_string(&config)?)
    }

    /// Arguments for one invocation, after any leading args.
    ///
    /// The message is the only positional argument and always follows `--`,
    /// so text starting with `-` is never read as an option.
    fn build_args(&self, request: &AgentRequest) -> Result<Vec<String>> {
        let mut args = self.leading_args.clone();
        args.extend([
            "-p".to_string(),
            "--output-format".to_string(),
            "stream-json".to_string(),
            "--verbose".to_string(),
            "--model".to_string(),
            self.model.clone(),
            "--permission-mode".to_string(),
            PERMISSION_MODE.to_string(),
            "--allowedTools".to_string(),
            ALLOWED_TOOLS.to_string(),
            "--mcp-config".to_string(),
            self.mcp_config_json()?,
        ]);

        if let Some(session_id) = &request.resume {
            args.extend(["--resume".to_string(), session_id.clone()]);
        } else if let Some(prompt) = &request.system_prompt {
            args.extend(["--system-prompt".to_string(), prompt.clone()]);
        }
        args.extend(["--".to_string(), request.message.clone()]);
        Ok(args)
    }
}

#[async_trait]
impl AgentRuntime for ClaudeCliRuntime {
    async fn start(&self, request: AgentRequest) -> Result<ReplyStream> {
        let args = self.build_args(&request)?;

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(AgentError::Spawn)?;

        info!(
            program = %self.program,
            resume = request.resume.is_some(),
            "Agent process started"
        );

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(target: "realstate_agent::stderr", "{}", line);
                }
            });
        }

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AgentError::ProcessFailed("stdout not captured".to_string()))?;

        let replies = CliReplies {
            child,
            lines: BufReader::new(stdout).lines(),
            pending: VecDeque::new(),
            saw_result: false,
            done: false,
        };

        let stream = futures::stream::unfold(Some(replies), |state| async move {
            let mut replies = state?;
            match replies.next_fragment().await? {
                Ok(fragment) => Some((Ok(fragment), Some(replies))),
                Err(e) => Some((Err(e), None)),
            }
        });
        let stream: ReplyStream = Box::pin(stream);
        Ok(stream)
    }
}

/// Reader state for one running agent process.
struct CliReplies {
    child: Child,
    lines: Lines<BufReader<ChildStdout>>,
    pending: VecDeque<ReplyFragment>,
    saw_result: bool,
    done: bool,
}

impl CliReplies {
    async fn next_fragment(&mut self) -> Option<Result<ReplyFragment>> {
        loop {
            if let Some(fragment) = self.pending.pop_front() {
                if matches!(fragment, ReplyFragment::Result { .. }) {
                    self.saw_result = true;
                }
                return Some(Ok(fragment));
            }
            if self.done {
                return None;
            }

            match self.lines.next_line().await {
                Ok(Some(line)) => self.pending.extend(parse_stream_line(&line)),
                Ok(None) => {
                    self.done = true;
                    return match self.child.wait().await {
                        Ok(status) if status.success() || self.saw_result => None,
                        Ok(status) => Some(Err(AgentError::ProcessFailed(format!(
                            "exited with {} before reporting a result",
                            status
                        )))),
                        Err(e) => Some(Err(AgentError::Io(e))),
                    };
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(AgentError::Io(e)));
                }
            }
        }
    }
}

/// Decode one `stream-json` line into reply fragments.
///
/// Lines that are not JSON, or message types other than `assistant` and
/// `result`, produce nothing.
pub(crate) fn parse_stream_line(line: &str) -> Vec<ReplyFragment> {
    let line = line.trim();
    if line.is_empty() {
        return Vec::new();
    }

    let value: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            debug!(error = %e, "Skipping non-JSON agent output line");
            return Vec::new();
        }
    };

    match value["type"].as_str() {
        Some("assistant") => value["message"]["content"]
            .as_array()
            .map(|blocks| {
                blocks
                    .iter()
                    .filter(|b| b["type"] == "text")
                    .filter_map(|b| b["text"].as_str())
                    .map(|t| ReplyFragment::Text(t.to_string()))
                    .collect()
            })
            .unwrap_or_default(),
        Some("result") => match value["session_id"].as_str() {
            Some(session_id) => vec![ReplyFragment::Result {
                session_id: session_id.to_string(),
            }],
            None => {
                warn!("Agent result line without session_id");
                Vec::new()
            }
        },
        other => {
            trace!(kind = ?other, "Ignoring agent message");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn runtime(command_line: &str) -> ClaudeCliRuntime {
        ClaudeCliRuntime::new(command_line, "sonnet", McpServer::supabase("proj", "sbp_token"))
    }

    #[test]
    fn test_parse_assistant_text_blocks() {
        let line = r#"{"type":"assistant","message":{"content":[
            {"type":"text","text":"Hola "},
            {"type":"tool_use","id":"t1","name":"mcp__supabase__execute_sql","input":{}},
            {"type":"text","text":"Ana"}
        ]},"session_id":"s-1"}"#
            .replace('\n', "");
        assert_eq!(
            parse_stream_line(&line),
            vec![
                ReplyFragment::Text("Hola ".to_string()),
                ReplyFragment::Text("Ana".to_string())
            ]
        );
    }

    #[test]
    fn test_parse_result_and_noise() {
        let result = r#"{"type":"result","subtype":"success","session_id":"s-9","result":"x"}"#;
        assert_eq!(
            parse_stream_line(result),
            vec![ReplyFragment::Result {
                session_id: "s-9".to_string()
            }]
        );
        assert!(parse_stream_line(r#"{"type":"system","subtype":"init"}"#).is_empty());
        assert!(parse_stream_line("not json").is_empty());
        assert!(parse_stream_line("   ").is_empty());
    }

    #[test]
    fn test_build_args_new_conversation() {
        let rt = runtime("claude");
        let args = rt
            .build_args(&AgentRequest::new_conversation("hola", "PROMPT"))
            .unwrap();

        assert_eq!(args[0], "-p");
        assert_eq!(&args[args.len() - 2..], &["--".to_string(), "hola".to_string()]);
        let pos = |flag: &str| args.iter().position(|a| a == flag).unwrap();
        assert_eq!(args[pos("--output-format") + 1], "stream-json");
        assert_eq!(args[pos("--allowedTools") + 1], "mcp__supabase__*");
        assert_eq!(args[pos("--system-prompt") + 1], "PROMPT");
        assert!(!args.contains(&"--resume".to_string()));

        let mcp: Value = serde_json::from_str(&args[pos("--mcp-config") + 1]).unwrap();
        assert_eq!(mcp["mcpServers"]["supabase"]["command"], "npx");
        assert_eq!(mcp["mcpServers"]["supabase"]["args"][3], "proj");
    }

    #[test]
    fn test_build_args_resume_skips_system_prompt() {
        let rt = runtime("npx @anthropic-ai/claude-code");
        let args = rt.build_args(&AgentRequest::resume("hola", "s-1")).unwrap();
        assert_eq!(rt.program, "npx");
        assert_eq!(args[0], "@anthropic-ai/claude-code");
        let pos = args.iter().position(|a| a == "--resume").unwrap();
        assert_eq!(args[pos + 1], "s-1");
        assert!(!args.contains(&"--system-prompt".to_string()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stream_from_fake_cli() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-agent.sh");
        std::fs::write(
            &script,
            concat!(
                "echo '{\"type\":\"system\",\"subtype\":\"init\"}'\n",
                "echo '{\"type\":\"assistant\",\"message\":{\"content\":[{\"type\":\"text\",\"text\":\"Tienes \"}]}}'\n",
                "echo '{\"type\":\"assistant\",\"message\":{\"content\":[{\"type\":\"text\",\"text\":\"3 propiedades\"}]}}'\n",
                "echo '{\"type\":\"result\",\"subtype\":\"success\",\"session_id\":\"s-42\"}'\n",
            ),
        )
        .unwrap();

        let rt = runtime(&format!("sh {}", script.display()));
        let stream = rt.start(AgentRequest::new_conversation("hola", "P")).await.unwrap();
        let fragments: Vec<_> = stream.map(|f| f.unwrap()).collect().await;

        assert_eq!(
            fragments,
            vec![
                ReplyFragment::Text("Tienes ".to_string()),
                ReplyFragment::Text("3 propiedades".to_string()),
                ReplyFragment::Result { session_id: "s-42".to_string() },
            ]
        );
    }

    #[test]
    fn test_build_args_message_with_leading_dash() {
        let rt = runtime("claude");
        for message in ["-5% de descuento al contrato 12", "--help", "-c"] {
            let args = rt.build_args(&AgentRequest::resume(message, "s-1")).unwrap();
            let separator = args.iter().position(|a| a == "--").unwrap();
            assert_eq!(separator, args.len() - 2);
            assert_eq!(args[separator + 1], message);
            assert_eq!(args.iter().filter(|a| *a == message).count(), 1);
        }
    }

    /// The fake CLI rejects unknown options and echoes the positional message.
    #[cfg(unix)]
    #[tokio::test]
    async fn test_dash_message_reaches_cli_as_positional() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("strict-agent.sh");
        std::fs::write(
            &script,
            concat!(
                "while [ \"$#\" -gt 0 ]; do\n",
                "  case \"$1\" in\n",
                "    --) shift; break ;;\n",
                "    -p|--verbose) shift ;;\n",
                "    --output-format|--model|--permission-mode|--allowedTools|--mcp-config|--resume|--system-prompt) shift 2 ;;\n",
                "    *) echo \"unknown option: $1\" >&2; exit 1 ;;\n",
                "  esac\n",
                "done\n",
                "printf '{\"type\":\"assistant\",\"message\":{\"content\":[{\"type\":\"text\",\"text\":\"%s\"}]}}\\n' \"$1\"\n",
                "echo '{\"type\":\"result\",\"session_id\":\"s-7\"}'\n",
            ),
        )
        .unwrap();

        let rt = runtime(&format!("sh {}", script.display()));
        let message = "-5% de descuento al contrato 12";
        let stream = rt.start(AgentRequest::resume(message, "s-1")).await.unwrap();
        let fragments: Vec<_> = stream.map(|f| f.unwrap()).collect().await;

        assert_eq!(
            fragments,
            vec![
                ReplyFragment::Text(message.to_string()),
                ReplyFragment::Result {
                    session_id: "s-7".to_string()
                },
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_cli_yields_error() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("failing-agent.sh");
        std::fs::write(&script, "echo 'boom' >&2\nexit 3\n").unwrap();

        let rt = runtime(&format!("sh {}", script.display()));
        let mut stream = rt.start(AgentRequest::resume("hola", "s-1")).await.unwrap();
        let first = stream.next().await.unwrap();
        assert!(matches!(first, Err(AgentError::ProcessFailed(_))));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_missing_program_fails_to_spawn() {
        let rt = runtime("/nonexistent/agent-binary");
        let result = rt.start(AgentRequest::resume("hola", "s-1")).await;
        assert!(matches!(result, Err(AgentError::Spawn(_))));
    }
}
