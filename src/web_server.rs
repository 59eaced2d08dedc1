use actix_web::{App, HttpServer, dev::Server, middleware, web};

use crate::config::{BotConfig, ServerConfig};
use crate::pipeline::Pipeline;
use crate::routes::{json_error_handler, post_command_handler};

pub fn build_server(
    server_config: ServerConfig,
    bot_config: BotConfig,
    pipeline: Pipeline,
) -> std::io::Result<Server> {
    let pipeline = web::Data::new(pipeline);
    let bot_config = web::Data::new(bot_config);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(pipeline.clone())
            .app_data(bot_config.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .wrap(middleware::Logger::default())
            .service(post_command_handler)
    })
    .bind((
        server_config
            .bind_address
            .unwrap_or("127.0.0.1".to_string()),
        server_config.bind_port.unwrap_or(12345),
    ))?
    .run();

    Ok(server)
}
