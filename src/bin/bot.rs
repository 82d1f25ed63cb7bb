use anyhow::Result;
use dotenvy::dotenv;
use log::{debug, error, info};
use serenity::async_trait;
use serenity::http::Http;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::guild::Member;
use serenity::model::id::GuildId;
use serenity::model::user::User;
use serenity::prelude::*;
use std::sync::Arc;

use herald::commands::{parse_command, CommandContext, CommandInvocation, CommandRegistry};
use herald::core::Config;
use herald::features::get_bot_version;
use herald::features::welcome::{
    DiscordBackend, GatewayMemberEvent, JoinGate, MemberUpdate, SettingsStore, WelcomeService,
};

struct Handler {
    gate: JoinGate,
    registry: CommandRegistry,
    command_context: Arc<CommandContext>,
}

impl Handler {
    fn new(service: &WelcomeService, command_prefix: String) -> Self {
        let command_context = CommandContext::new(
            service.settings().clone(),
            service.classifier().clone(),
            command_prefix,
        );
        Handler {
            gate: service.gate(),
            registry: CommandRegistry::with_builtin(),
            command_context: Arc::new(command_context),
        }
    }

    async fn forward(&self, guild_id: GuildId, user: &User, event: GatewayMemberEvent) {
        let Some(new_status) = event.forwarded_status() else {
            debug!("Not forwarding {event:?} for {} in {guild_id}", user.id);
            return;
        };
        let decision = self
            .gate
            .admit(MemberUpdate {
                user_id: user.id,
                guild_id,
                display_handle: user.name.clone(),
                is_bot: user.bot,
                new_status,
            })
            .await;
        debug!("Member {} in {guild_id} -> {new_status}: {decision:?}", user.id);
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn guild_member_addition(&self, _ctx: Context, new_member: Member) {
        info!(
            "👋 {} joined guild {}",
            new_member.user.name, new_member.guild_id
        );
        let event = GatewayMemberEvent::Added {
            pending: new_member.pending,
        };
        self.forward(new_member.guild_id, &new_member.user, event).await;
    }

    async fn guild_member_update(&self, _ctx: Context, old: Option<Member>, new: Member) {
        let event = GatewayMemberEvent::Updated {
            was_pending: old.map(|m| m.pending),
            pending: new.pending,
        };
        self.forward(new.guild_id, &new.user, event).await;
    }

    async fn guild_member_removal(
        &self,
        _ctx: Context,
        guild_id: GuildId,
        user: User,
        _member: Option<Member>,
    ) {
        self.forward(guild_id, &user, GatewayMemberEvent::Removed).await;
    }

    async fn guild_ban_addition(&self, _ctx: Context, guild_id: GuildId, banned_user: User) {
        self.forward(guild_id, &banned_user, GatewayMemberEvent::Banned).await;
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let Some(name) = parse_command(&self.command_context.prefix, &msg.content) else {
            return;
        };
        if !self.registry.contains(&name) {
            return;
        }

        let invocation = CommandInvocation::from_message(name, &msg);
        info!(
            "[{}] 📥 Command '{}' from {} in {:?}",
            invocation.request_id, invocation.name, invocation.invoker, invocation.guild_id
        );

        let reply = match self
            .registry
            .dispatch(Arc::clone(&self.command_context), &invocation)
            .await
        {
            Some(Ok(reply)) => reply,
            Some(Err(e)) => {
                error!(
                    "[{}] Error handling command '{}': {e}",
                    invocation.request_id, invocation.name
                );
                "❌ Sorry, I encountered an error processing your command.".to_string()
            }
            None => return,
        };

        if reply.is_empty() {
            return;
        }
        if let Err(why) = msg.reply(&ctx, reply).await {
            error!("[{}] Failed to send reply: {why}", invocation.request_id);
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!("🤖 Bot ID: {}", ready.user.id);

        if let Some(shard) = ready.shard {
            info!("⚡ Shard: {}/{}", shard[0] + 1, shard[1]);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    info!("Starting Herald v{}...", get_bot_version());

    let settings = SettingsStore::load_or_init(&config.settings_path)?;
    let snapshot = settings.snapshot().await;
    info!(
        "⏱️ Welcome pacing: {}s before the first DM, {}s between DMs",
        snapshot.initial_delay_seconds, snapshot.batch_delay_seconds
    );

    let http = Arc::new(Http::new(&config.discord_token));
    let service = WelcomeService::discord(settings, DiscordBackend::new(http));
    let handler = Handler::new(&service, config.command_prefix.clone());

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_BANS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            error!("This could indicate:");
            error!("  - Invalid bot token format");
            error!("  - Network issues reaching Discord API");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Bot configured successfully. Connecting to Discord gateway...");

    service.spawn_scheduler();

    info!("Gateway intents: {intents:?}");

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        error!("This could be due to:");
        error!("  - Invalid bot token");
        error!("  - Missing privileged intents (Server Members, Message Content)");
        error!("  - Discord API outage");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
