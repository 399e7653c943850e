use std::sync::Arc;

use async_trait::async_trait;
use teloxide::{prelude::*, types::BotCommand};

use crate::{
    command::{bot_commands, parse_command, CommandParseError},
    dispatcher::{Dispatcher, Replier},
    source::Provider,
};

// telegram rejects longer messages
const MESSAGE_LIMIT: usize = 4096;

/// Sends replies into one chat.
pub struct ChatReplier {
    bot: Bot,
    chat_id: ChatId,
}

impl ChatReplier {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl Replier for ChatReplier {
    async fn reply(&self, text: String) {
        for chunk in split_message(&text, MESSAGE_LIMIT) {
            if let Err(err) = self.bot.send_message(self.chat_id, chunk).await {
                log::error!("failed to send message to chat {}: {}", self.chat_id.0, err);
            }
        }
    }
}

/// Long-polls for commands until the process is interrupted.
pub async fn run<P: Provider + 'static>(bot: Bot, dispatcher: Arc<Dispatcher<P>>) {
    if let Err(err) = register_bot_commands(&bot).await {
        log::warn!("failed to register bot commands: {}", err);
    }
    log::info!("listening for telegram commands");

    teloxide::repl(bot, move |bot: Bot, msg: Message| {
        let dispatcher = dispatcher.clone();
        async move {
            let Some(text) = msg.text() else {
                return respond(());
            };
            match parse_command(text) {
                Ok(command) => {
                    log::info!("chat {}: {:?}", msg.chat.id.0, command);
                    let requester = msg.from.as_ref().and_then(|user| user.username.clone());
                    let replier = ChatReplier::new(bot, msg.chat.id);
                    dispatcher
                        .handle(command, requester.as_deref(), &replier)
                        .await;
                }
                Err(CommandParseError::NotACommand) => {}
                Err(err) => log::debug!("ignoring chat {}: {}", msg.chat.id.0, err),
            }
            respond(())
        }
    })
    .await;
}

async fn register_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    let commands: Vec<BotCommand> = bot_commands()
        .into_iter()
        .map(|(cmd, desc)| BotCommand::new(cmd, desc))
        .collect();
    bot.set_my_commands(commands).await?;
    Ok(())
}

/// Splits on line boundaries into chunks of at most `limit` UTF-16 units. A
/// single line longer than `limit` is cut hard.
fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = vec![];
    let mut current: Option<(String, usize)> = None;
    for line in text.split('\n') {
        for piece in cut_line(line, limit) {
            let len = utf16_len(&piece);
            current = match current.take() {
                Some((mut chunk, chunk_len)) if chunk_len + 1 + len <= limit => {
                    chunk.push('\n');
                    chunk.push_str(&piece);
                    Some((chunk, chunk_len + 1 + len))
                }
                Some((chunk, _)) => {
                    chunks.push(chunk);
                    Some((piece, len))
                }
                None => Some((piece, len)),
            };
        }
    }
    chunks.extend(current.map(|(chunk, _)| chunk));
    chunks
}

/// Cuts one line into pieces of at most `limit` UTF-16 units.
fn cut_line(line: &str, limit: usize) -> Vec<String> {
    let mut pieces = vec![];
    let mut piece = String::new();
    let mut piece_len = 0;
    for c in line.chars() {
        if piece_len + c.len_utf16() > limit && !piece.is_empty() {
            pieces.push(std::mem::take(&mut piece));
            piece_len = 0;
        }
        piece_len += c.len_utf16();
        piece.push(c);
    }
    pieces.push(piece);
    pieces
}

// telegram measures message length in UTF-16 code units
fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}
