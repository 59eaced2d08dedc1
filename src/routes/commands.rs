use actix_web::{HttpResponse, Responder, post, web};
use serde::{Deserialize, Serialize};

use super::error_response;
use crate::access::Caller;
use crate::commands::Command;
use crate::config::BotConfig;
use crate::judge::JudgeReport;
use crate::pipeline::Pipeline;

/// One chat message forwarded by the gateway
#[derive(Deserialize, Debug)]
pub struct CommandRequest {
    #[serde(flatten)]
    pub caller: Caller,
    pub content: String,
}

impl CommandRequest {
    /// Text after the command prefix, or `None` if the message is not a
    /// command
    pub fn strip_prefix<'a>(&'a self, prefix: &str) -> Option<&'a str> {
        self.content.trim_start().strip_prefix(prefix)
    }
}

#[derive(Serialize, Debug)]
pub struct CommandResponse {
    /// Text to post back; `None` when the message was ignored
    pub reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<JudgeReport>,
}

#[post("/commands")]
pub async fn post_command_handler(
    pipeline: web::Data<Pipeline>,
    bot: web::Data<BotConfig>,
    body: web::Json<CommandRequest>,
) -> impl Responder {
    let Some(content) = body.strip_prefix(&bot.prefix) else {
        log::debug!("Ignored message from user {}", body.caller.user_id);
        return HttpResponse::Ok().json(CommandResponse {
            reply: None,
            report: None,
        });
    };

    let command = match Command::parse(content) {
        Ok(command) => command,
        Err(e) => {
            log::debug!("Rejected command from user {}: {e}", body.caller.user_id);
            return error_response(&e);
        }
    };

    match pipeline.handle(&body.caller, command).await {
        Ok(reply) => HttpResponse::Ok().json(CommandResponse {
            reply: Some(reply.text),
            report: reply.report,
        }),
        Err(e) => {
            log::info!("Command from user {} failed: {e}", body.caller.user_id);
            error_response(&e)
        }
    }
}
