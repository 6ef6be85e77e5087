use std::collections::HashMap;

use autodim_config::{DimensioningConfig, FailurePolicy};
use tracing::warn;

use crate::pipeline::run_auto_dimension;
use crate::session::Session;

#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub name: String,
    pub args: Vec<String>,
}

impl CommandRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct CommandResponse {
    pub success: bool,
    pub message: Option<String>,
}

impl CommandResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

pub trait CommandHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse;
}

pub struct CommandContext<'a> {
    pub session: &'a mut Session,
    pub config: &'a DimensioningConfig,
}

pub struct CommandBus {
    handlers: HashMap<&'static str, Box<dyn CommandHandler>>,
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandBus {
    pub fn new() -> Self {
        let mut bus = Self {
            handlers: HashMap::new(),
        };
        bus.register(AutoDimensionCommand);
        bus.register(ClearDimensionsCommand);
        bus
    }

    pub fn register<H: CommandHandler + 'static>(&mut self, handler: H) {
        self.handlers.insert(handler.name(), Box::new(handler));
    }

    pub fn dispatch(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        if let Some(handler) = self.handlers.get(request.name.as_str()) {
            handler.execute(request, context)
        } else {
            CommandResponse::err(format!("未知命令: {}", request.name))
        }
    }

    pub fn available_commands(&self) -> impl Iterator<Item = &&'static str> {
        self.handlers.keys()
    }
}

/// `auto_dimension [abort_all|isolate]`，参数覆盖配置中的失败策略。
struct AutoDimensionCommand;

impl AutoDimensionCommand {
    fn policy_override(request: &CommandRequest) -> Result<Option<FailurePolicy>, String> {
        match request.args.first().map(String::as_str) {
            None => Ok(None),
            Some("abort_all") => Ok(Some(FailurePolicy::AbortAll)),
            Some("isolate") => Ok(Some(FailurePolicy::Isolate)),
            Some(other) => Err(format!("未知失败策略: {other}")),
        }
    }
}

impl CommandHandler for AutoDimensionCommand {
    fn name(&self) -> &'static str {
        "auto_dimension"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let config = match Self::policy_override(request) {
            Ok(Some(failure_policy)) => DimensioningConfig {
                failure_policy,
                ..context.config.clone()
            },
            Ok(None) => context.config.clone(),
            Err(message) => return CommandResponse::err(message),
        };

        match run_auto_dimension(context.session, &config) {
            Ok(report) => {
                let message = format!(
                    "已创建 {} 个尺寸（轴网 {}，柱 {}），跳过 {} 项",
                    report.created.len(),
                    report.grid_dimensions,
                    report.column_dimensions,
                    report.skipped.len()
                );
                context.session.record_report(report);
                CommandResponse::ok(message)
            }
            Err(err) => {
                warn!(error = %err, "自动标注失败，文档未修改");
                CommandResponse::err(format!("自动标注失败: {err}"))
            }
        }
    }
}

struct ClearDimensionsCommand;

impl CommandHandler for ClearDimensionsCommand {
    fn name(&self) -> &'static str {
        "clear_dimensions"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let mut transaction = context.session.begin_transaction("Clear Dimensions");
        let removed = transaction.document_mut().remove_dimensions();
        transaction.commit();
        CommandResponse::ok(format!("已删除 {removed} 个尺寸"))
    }
}
