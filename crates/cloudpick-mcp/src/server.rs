use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::sync::Arc;

use cloudpick_catalog::{builtin_table, note_text, notes};
use cloudpick_core::{
    evaluate, weight_stages, CapabilityTable, CostPriority, EngineError, Factor, OpsPreference,
    PerformancePriority, Scenario, Service,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::protocol::{JsonRpcRequest, JsonRpcResponse};

const DEFAULT_MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Stateless JSON-RPC surface over the decision engine. The capability
/// table is fixed at construction and never mutated afterwards, so the
/// server can be shared freely.
pub struct AdvisorServer {
    table: Arc<CapabilityTable>,
}

impl AdvisorServer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: Arc::new(builtin_table()),
        }
    }

    pub fn with_table(table: CapabilityTable) -> Result<Self, EngineError> {
        table.validate()?;
        Ok(Self {
            table: Arc::new(table),
        })
    }

    /// Builds a server from the environment. `CLOUDPICK_CATALOG` may name
    /// a JSON file holding a replacement capability table; it is validated
    /// before use so a malformed override fails at startup, not mid-call.
    pub fn from_env() -> io::Result<Self> {
        match std::env::var("CLOUDPICK_CATALOG") {
            Ok(path) if !path.trim().is_empty() => {
                let raw = fs::read_to_string(path.trim())?;
                let table: CapabilityTable = serde_json::from_str(&raw).map_err(|err| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("invalid catalog json: {err}"),
                    )
                })?;
                Self::with_table(table)
                    .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))
            }
            _ => Ok(Self::new()),
        }
    }

    pub fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                request.id.unwrap_or(Value::Null),
                -32600,
                "invalid jsonrpc version",
            ));
        }

        let is_notification = request.id.is_none();
        let id = request.id.clone().unwrap_or(Value::Null);

        if is_notification && request.method == "notifications/initialized" {
            return None;
        }

        let response = match request.method.as_str() {
            "initialize" => {
                let protocol_version = request
                    .params
                    .get("protocolVersion")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_MCP_PROTOCOL_VERSION);
                JsonRpcResponse::success(
                    id,
                    json!({
                        "protocolVersion": protocol_version,
                        "serverInfo": {"name": "cloudpick-mcp", "version": "0.1.0"},
                        "capabilities": {
                            "tools": {
                                "listChanged": false
                            },
                            "resources": {
                                "subscribe": false,
                                "listChanged": false
                            }
                        }
                    }),
                )
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, tools_list_result()),
            "tools/call" => self.handle_tools_call(id, request.params),
            "resources/list" => JsonRpcResponse::success(id, resources_list_result()),
            "resources/read" => handle_resources_read(id, request.params),
            _ => JsonRpcResponse::error(id, -32601, "method not found"),
        };

        Some(response)
    }

    fn handle_tools_call(&self, id: Value, params: Value) -> JsonRpcResponse {
        let parsed: ToolsCallParams = match serde_json::from_value(params) {
            Ok(v) => v,
            Err(err) => {
                return JsonRpcResponse::error(id, -32602, format!("invalid params: {err}"));
            }
        };

        match parsed.name.as_str() {
            "advisor_evaluate" => self.exec_advisor_evaluate(id, parsed.arguments),
            "advisor_weights" => self.exec_advisor_weights(id, parsed.arguments),
            "advisor_catalog" => self.exec_advisor_catalog(id, parsed.arguments),
            "advisor_compare" => self.exec_advisor_compare(id, parsed.arguments),
            _ => JsonRpcResponse::error(id, -32601, "unknown tool"),
        }
    }

    fn exec_advisor_evaluate(&self, id: Value, arguments: Option<Value>) -> JsonRpcResponse {
        let args: EvaluateInput = match parse_args(arguments) {
            Ok(v) => v,
            Err(resp) => return with_id(resp, id),
        };
        let (scenario, cost, ops, performance) = match args.selection() {
            Ok(v) => v,
            Err(err) => return JsonRpcResponse::invalid_params(id, err.to_string()),
        };
        let evaluation = match evaluate(&self.table, scenario, cost, ops, performance) {
            Ok(v) => v,
            Err(err) => return JsonRpcResponse::invalid_params(id, err.to_string()),
        };
        let top_score = evaluation.ranked.first().map_or(0.0, |entry| entry.score);
        let summary = format!(
            "recommended {} (score {top_score}, confidence {})",
            evaluation.best, evaluation.confidence
        );
        let structured = serde_json::to_value(&evaluation).unwrap_or_else(|_| json!({}));

        JsonRpcResponse::success(
            id,
            json!({
                "structuredContent": structured,
                "content": [{"type":"text", "text": summary}]
            }),
        )
    }

    fn exec_advisor_weights(&self, id: Value, arguments: Option<Value>) -> JsonRpcResponse {
        let args: EvaluateInput = match parse_args(arguments) {
            Ok(v) => v,
            Err(resp) => return with_id(resp, id),
        };
        let (scenario, cost, ops, performance) = match args.selection() {
            Ok(v) => v,
            Err(err) => return JsonRpcResponse::invalid_params(id, err.to_string()),
        };
        let stages = weight_stages(scenario, cost, ops, performance);
        let structured = serde_json::to_value(&stages).unwrap_or_else(|_| json!({}));

        JsonRpcResponse::success(
            id,
            json!({
                "structuredContent": structured,
                "content": [{"type":"text", "text": format!("weight pipeline for {scenario}")}]
            }),
        )
    }

    fn exec_advisor_catalog(&self, id: Value, arguments: Option<Value>) -> JsonRpcResponse {
        let _args: CatalogInput = match parse_args_optional(arguments) {
            Ok(v) => v,
            Err(resp) => return with_id(resp, id),
        };
        let scenarios = Scenario::ALL
            .into_iter()
            .map(|scenario| {
                json!({
                    "id": scenario.id(),
                    "description": scenario.description()
                })
            })
            .collect::<Vec<_>>();
        let factors = Factor::ALL
            .into_iter()
            .map(Factor::as_str)
            .collect::<Vec<_>>();
        let services = Service::ALL
            .into_iter()
            .map(Service::as_str)
            .collect::<Vec<_>>();
        let capabilities = serde_json::to_value(self.table.as_ref()).unwrap_or_else(|_| json!({}));

        JsonRpcResponse::success(
            id,
            json!({
                "structuredContent": {
                    "scenarios": scenarios,
                    "factors": factors,
                    "services": services,
                    "capabilities": capabilities
                },
                "content": [{"type":"text", "text": format!(
                    "{} services rated across {} factors",
                    Service::ALL.len(),
                    Factor::ALL.len()
                )}]
            }),
        )
    }

    fn exec_advisor_compare(&self, id: Value, arguments: Option<Value>) -> JsonRpcResponse {
        let args: CompareInput = match parse_args(arguments) {
            Ok(v) => v,
            Err(resp) => return with_id(resp, id),
        };
        let mut sides = Vec::with_capacity(2);
        for service in [args.first, args.second] {
            let Some(row) = self.table.row(service) else {
                return JsonRpcResponse::invalid_params(
                    id,
                    EngineError::MissingService(service).to_string(),
                );
            };
            sides.push(json!({
                "service": service,
                "capabilities": serde_json::to_value(row).unwrap_or_else(|_| json!({}))
            }));
        }
        let factors = Factor::ALL
            .into_iter()
            .map(Factor::as_str)
            .collect::<Vec<_>>();
        let mut sides = sides.into_iter();
        let first = sides.next().unwrap_or_else(|| json!({}));
        let second = sides.next().unwrap_or_else(|| json!({}));

        JsonRpcResponse::success(
            id,
            json!({
                "structuredContent": {
                    "first": first,
                    "second": second,
                    "factors": factors
                },
                "content": [{"type":"text", "text": format!(
                    "capability profile of {} vs {}", args.first, args.second
                )}]
            }),
        )
    }

    pub fn serve_stdio(&self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut reader = io::BufReader::new(stdin.lock());
        let mut stdout = io::stdout();
        let mut line = String::new();

        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }

            let trimmed = line.trim_end_matches(['\r', '\n']).trim_start();
            if trimmed.is_empty() {
                continue;
            }

            let (payload, frame) = if is_stdio_header_line(trimmed) {
                let content_length = match read_stdio_content_length(&mut reader, trimmed) {
                    Ok(v) => v,
                    Err(err) => {
                        let response = JsonRpcResponse::error(
                            Value::Null,
                            -32700,
                            format!("invalid stdio frame: {err}"),
                        );
                        write_stdio_response(&mut stdout, &response, StdioFrame::LineDelimited)?;
                        continue;
                    }
                };

                let mut body = vec![0_u8; content_length];
                if let Err(err) = reader.read_exact(&mut body) {
                    let response = JsonRpcResponse::error(
                        Value::Null,
                        -32700,
                        format!("invalid stdio frame body: {err}"),
                    );
                    write_stdio_response(&mut stdout, &response, StdioFrame::ContentLength)?;
                    continue;
                }
                (body, StdioFrame::ContentLength)
            } else {
                (trimmed.as_bytes().to_vec(), StdioFrame::LineDelimited)
            };

            let request: JsonRpcRequest = match serde_json::from_slice(&payload) {
                Ok(v) => v,
                Err(err) => {
                    let response =
                        JsonRpcResponse::error(Value::Null, -32700, format!("parse error: {err}"));
                    write_stdio_response(&mut stdout, &response, frame)?;
                    continue;
                }
            };

            if let Some(response) = self.handle_request(request) {
                write_stdio_response(&mut stdout, &response, frame)?;
            }
        }

        Ok(())
    }

    /// Question-driven terminal mode: four numeric menus, then a full
    /// decision report on stdout.
    pub fn run_interactive(&self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut input = io::BufReader::new(stdin.lock());
        let mut output = io::stdout().lock();
        self.run_questionnaire(&mut input, &mut output)
    }

    fn run_questionnaire<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> io::Result<()> {
        writeln!(output, "Select traffic pattern:")?;
        writeln!(output, "1. Bursty / Unpredictable")?;
        writeln!(output, "2. Steady High Traffic")?;
        let scenario = prompt_choice(input, output, "Enter choice (1 or 2): ", |code| {
            match code {
                1 => Some(Scenario::BurstyLowCost),
                2 => Some(Scenario::SteadyHighTraffic),
                _ => None,
            }
        })?;

        writeln!(output, "\nHow important is cost control?")?;
        writeln!(output, "1. Very important")?;
        writeln!(output, "2. Moderate")?;
        writeln!(output, "3. Not important")?;
        let cost = prompt_choice(input, output, "Enter choice (1/2/3): ", |code| {
            CostPriority::from_code(code).ok()
        })?;

        writeln!(output, "\nCan you manage servers yourself?")?;
        writeln!(output, "1. No, minimal ops")?;
        writeln!(output, "2. Some ops ok")?;
        writeln!(output, "3. Yes, full control needed")?;
        let ops = prompt_choice(input, output, "Enter choice (1/2/3): ", |code| {
            OpsPreference::from_code(code).ok()
        })?;

        writeln!(output, "\nWhat matters more?")?;
        writeln!(output, "1. Ultra-low latency")?;
        writeln!(output, "2. Balanced")?;
        writeln!(output, "3. Massive scalability")?;
        let performance = prompt_choice(input, output, "Enter choice (1/2/3): ", |code| {
            PerformancePriority::from_code(code).ok()
        })?;

        let evaluation = evaluate(&self.table, scenario, cost, ops, performance)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;

        writeln!(output, "\n================ DECISION RESULT ================")?;
        writeln!(output, "Scenario: {scenario}")?;
        writeln!(output, "Recommended Service: {}", evaluation.best)?;
        writeln!(output, "Decision Confidence: {}", evaluation.confidence)?;

        writeln!(output, "\nScores:")?;
        for entry in &evaluation.ranked {
            let marker = if entry.service == evaluation.best {
                "  <- recommended"
            } else {
                ""
            };
            writeln!(output, "  {}: {}{marker}", entry.service, entry.score)?;
        }

        writeln!(output, "\nWhy this service?")?;
        writeln!(output, "{}", evaluation.explanations.why_best)?;

        writeln!(output, "\nWhy not the others?")?;
        for (service, reason) in &evaluation.explanations.why_not {
            writeln!(output, "- {service}: {reason}")?;
        }

        writeln!(output, "\nAlternative: {}", evaluation.bundle.alternative)?;
        writeln!(output, "Rejected: {}", evaluation.bundle.rejected)?;
        output.flush()
    }
}

impl Default for AdvisorServer {
    fn default() -> Self {
        Self::new()
    }
}

fn prompt_choice<R: BufRead, W: Write, T>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    parse: impl Fn(u8) -> Option<T>,
) -> io::Result<T> {
    loop {
        write!(output, "{prompt}")?;
        output.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before a choice was made",
            ));
        }
        if let Some(choice) = line.trim().parse::<u8>().ok().and_then(&parse) {
            return Ok(choice);
        }
        writeln!(output, "Please enter one of the listed numbers.")?;
    }
}

fn tools_list_result() -> Value {
    json!({
        "tools": [
            {
                "name": "advisor_evaluate",
                "description": "Run the full weighted recommendation: ranked scores, confidence, explanations, and the recommended/alternative/rejected bundle.",
                "inputSchema": {
                    "type": "object",
                    "required": ["scenario", "cost", "ops", "performance"],
                    "properties": {
                        "scenario": {"type":"string", "enum": ["bursty_low_cost", "steady_high_traffic"]},
                        "cost": {"type":"integer", "enum": [1, 2, 3]},
                        "ops": {"type":"integer", "enum": [1, 2, 3]},
                        "performance": {"type":"integer", "enum": [1, 2, 3]}
                    }
                }
            },
            {
                "name": "advisor_weights",
                "description": "Show the weight pipeline stage by stage: initial, adjusted, normalized.",
                "inputSchema": {
                    "type": "object",
                    "required": ["scenario", "cost", "ops", "performance"],
                    "properties": {
                        "scenario": {"type":"string", "enum": ["bursty_low_cost", "steady_high_traffic"]},
                        "cost": {"type":"integer", "enum": [1, 2, 3]},
                        "ops": {"type":"integer", "enum": [1, 2, 3]},
                        "performance": {"type":"integer", "enum": [1, 2, 3]}
                    }
                }
            },
            {
                "name": "advisor_catalog",
                "description": "List scenarios, factors, services, and the capability table in use.",
                "inputSchema": {
                    "type": "object",
                    "properties": {}
                }
            },
            {
                "name": "advisor_compare",
                "description": "Return the capability rows of two services side by side.",
                "inputSchema": {
                    "type": "object",
                    "required": ["first", "second"],
                    "properties": {
                        "first": {"type":"string", "enum": ["Lambda", "ECS", "EC2"]},
                        "second": {"type":"string", "enum": ["Lambda", "ECS", "EC2"]}
                    }
                }
            }
        ]
    })
}

fn resources_list_result() -> Value {
    let resources = notes()
        .iter()
        .map(|note| {
            json!({
                "uri": note.uri,
                "name": note.name,
                "description": note.description,
                "mimeType": note.mime_type
            })
        })
        .collect::<Vec<_>>();
    json!({
        "resources": resources
    })
}

fn handle_resources_read(id: Value, params: Value) -> JsonRpcResponse {
    let parsed: ResourceReadParams = match serde_json::from_value(params) {
        Ok(v) => v,
        Err(err) => {
            return JsonRpcResponse::error(id, -32602, format!("invalid params: {err}"));
        }
    };

    let Some(text) = note_text(&parsed.uri) else {
        return JsonRpcResponse::error(id, -32602, "unknown resource uri");
    };

    JsonRpcResponse::success(
        id,
        json!({
            "contents": [{
                "uri": parsed.uri,
                "mimeType": "text/markdown",
                "text": text
            }]
        }),
    )
}

fn with_id(mut response: JsonRpcResponse, id: Value) -> JsonRpcResponse {
    response.id = id;
    response
}

#[derive(Clone, Copy)]
enum StdioFrame {
    LineDelimited,
    ContentLength,
}

fn write_stdio_response(
    stdout: &mut io::Stdout,
    response: &JsonRpcResponse,
    frame: StdioFrame,
) -> io::Result<()> {
    match frame {
        StdioFrame::LineDelimited => {
            let serialized = serde_json::to_string(response)?;
            writeln!(stdout, "{serialized}")?;
        }
        StdioFrame::ContentLength => {
            let serialized = serde_json::to_vec(response)?;
            write!(stdout, "Content-Length: {}\r\n\r\n", serialized.len())?;
            stdout.write_all(&serialized)?;
        }
    }
    stdout.flush()
}

fn is_stdio_header_line(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    lower.starts_with("content-length:") || lower.starts_with("content-type:")
}

fn read_stdio_content_length<R: BufRead>(reader: &mut R, first_line: &str) -> io::Result<usize> {
    let mut content_length = parse_content_length(first_line);
    let mut header_line = String::new();
    loop {
        header_line.clear();
        if reader.read_line(&mut header_line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "unexpected eof while reading frame headers",
            ));
        }
        let trimmed = header_line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            break;
        }
        if let Some(v) = parse_content_length(trimmed) {
            content_length = Some(v);
        }
    }
    content_length
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "missing content-length header"))
}

fn parse_content_length(line: &str) -> Option<usize> {
    let (name, value) = line.split_once(':')?;
    if !name.trim().eq_ignore_ascii_case("content-length") {
        return None;
    }
    value.trim().parse::<usize>().ok()
}

fn parse_args<T: for<'de> Deserialize<'de>>(
    arguments: Option<Value>,
) -> Result<T, JsonRpcResponse> {
    let args = match arguments {
        Some(v) => v,
        None => {
            return Err(JsonRpcResponse::error(
                Value::Null,
                -32602,
                "missing tool arguments",
            ))
        }
    };

    serde_json::from_value(args).map_err(|err| {
        JsonRpcResponse::error(
            Value::Null,
            -32602,
            format!("invalid tool arguments: {err}"),
        )
    })
}

fn parse_args_optional<T: for<'de> Deserialize<'de> + Default>(
    arguments: Option<Value>,
) -> Result<T, JsonRpcResponse> {
    match arguments {
        Some(v) => serde_json::from_value(v).map_err(|err| {
            JsonRpcResponse::error(
                Value::Null,
                -32602,
                format!("invalid tool arguments: {err}"),
            )
        }),
        None => Ok(T::default()),
    }
}

#[derive(Debug, Deserialize)]
struct ToolsCallParams {
    name: String,
    arguments: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ResourceReadParams {
    uri: String,
}

#[derive(Debug, Deserialize)]
struct EvaluateInput {
    scenario: String,
    cost: u8,
    ops: u8,
    performance: u8,
}

impl EvaluateInput {
    fn selection(
        &self,
    ) -> Result<(Scenario, CostPriority, OpsPreference, PerformancePriority), EngineError> {
        let scenario = Scenario::parse(&self.scenario)?;
        let cost = CostPriority::from_code(self.cost)?;
        let ops = OpsPreference::from_code(self.ops)?;
        let performance = PerformancePriority::from_code(self.performance)?;
        Ok((scenario, cost, ops, performance))
    }
}

#[derive(Debug, Default, Deserialize)]
struct CatalogInput {}

#[derive(Debug, Deserialize)]
struct CompareInput {
    first: Service,
    second: Service,
}
