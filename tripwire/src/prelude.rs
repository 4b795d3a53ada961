//! Commonly used types, for glob import.

pub use crate::agent::{Agent, AgentInput};
pub use crate::context::RunContext;
pub use crate::error::{Error, Result};
pub use crate::guardrail::{
    FactCheckingGuardrail, FactCheckingGuardrailCheck, FactCheckingGuardrailResult,
    GuardrailConfig, GuardrailOutput, GuardrailRegistry, InputGuardrail, InputGuardrailCheck,
    InputGuardrailResult, OutputGuardrail, OutputGuardrailCheck, OutputGuardrailResult,
    fact_checking_guardrail, input_guardrail, output_guardrail,
};
pub use crate::handoff::Handoff;
pub use crate::model_settings::ModelSettings;
pub use crate::output_schema::AgentOutputSchema;
pub use crate::providers::openai::{OpenAIClient, OpenAIProvider, OpenAIResponsesModel};
pub use crate::providers::{Model, ModelProvider, ModelRequest, ModelResponse, ResponsesClient};
pub use crate::telemetry::{ModelTracing, SpanCollector, TraceProcessor};
pub use crate::tool::{FunctionTool, Tool};
pub use crate::usage::Usage;
