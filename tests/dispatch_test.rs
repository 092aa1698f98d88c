//! Dispatch integration tests
//! Run with: cargo test --test dispatch_test

use std::sync::{Arc, Mutex, Once};

use rtm_bot::infrastructure::adapters::MemoryConnection;
use rtm_bot::infrastructure::runtime::ManualSpawner;
use rtm_bot::{Bot, ChannelKind, Command, Conversation, ListenerConversation, Message};

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

fn setup() -> (Bot, Arc<MemoryConnection>, Arc<ManualSpawner>) {
    ensure_init();
    let connection = Arc::new(MemoryConnection::new());
    let spawner = Arc::new(ManualSpawner::new());
    let bot = Bot::with_connection("U1", connection.clone(), spawner.clone());
    (bot, connection, spawner)
}

fn texts(connection: &MemoryConnection) -> Vec<String> {
    connection.sent().iter().map(|m| m.text().to_string()).collect()
}

/// Each matching command gets its own captured parameters
#[tokio::test]
async fn test_matching_commands_receive_their_own_params() {
    let (bot, _connection, spawner) = setup();
    let seen: Arc<Mutex<Vec<(String, Option<String>)>>> = Arc::new(Mutex::new(Vec::new()));

    for pattern in ["hello {name}", "hello {who}", "goodbye {name}", "{greeting} world"] {
        let seen = seen.clone();
        let tag = pattern.to_string();
        bot.command(pattern, move |conv: Conversation| {
            let seen = seen.clone();
            let tag = tag.clone();
            async move {
                let value = conv.params().iter().next().map(|(_, v)| v.to_string());
                seen.lock().unwrap().push((tag, value));
            }
        }).unwrap();
    }

    let mut msg = Message::new("C1", "U2", "!hello world");
    msg.normalize(&bot.prefix(), bot.id());
    assert!(bot.search_command(&msg));
    assert_eq!(spawner.pending(), 3);
    spawner.run_until_idle().await;

    let seen = seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            ("hello {name}".to_string(), Some("world".to_string())),
            ("hello {who}".to_string(), Some("world".to_string())),
            ("{greeting} world".to_string(), Some("hello".to_string())),
        ]
    );
}

#[tokio::test]
async fn test_help_lists_commands_in_registration_order() {
    let (bot, connection, spawner) = setup();
    bot.register_command(
        Command::new("deploy {service}", |_c: Conversation| async {}).unwrap()
            .with_description("Deploy a service"),
    ).unwrap();
    bot.command("status", |_c: Conversation| async {}).unwrap();

    let msg = Message::new("D9", "U2", "help").with_channel_kind(ChannelKind::Direct);
    bot.process(msg).await;
    spawner.run_until_idle().await;

    let sent = connection.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].channel_id, "D9");
    let lines: Vec<&str> = sent[0].text().lines().filter(|l| l.starts_with('`')).collect();
    assert_eq!(lines, ["`deploy {service}` – Deploy a service", "`status`"]);
}

#[tokio::test]
async fn test_listener_hears_unaddressed_and_unmatched_messages() {
    let (bot, connection, spawner) = setup();
    bot.command("deploy {service}", |c: Conversation| async move {
        let _ = c.say("deploying").await;
    }).unwrap();
    bot.hear("foo", |c: ListenerConversation| async move {
        let _ = c.say(format!("heard: {}", c.message().raw_text)).await;
    }).unwrap();

    bot.process(Message::new("C1", "U2", "xx foo yy")).await;
    bot.process(Message::new("C1", "U2", "<@U1> xx foo yy")).await;
    bot.process(Message::new("C1", "U2", "!deploy foo")).await;
    spawner.run_until_idle().await;

    assert_eq!(
        texts(&connection),
        ["heard: xx foo yy", "heard: <@U1> xx foo yy", "deploying"]
    );
}

#[tokio::test]
async fn test_replies_mention_sender_in_channels() {
    let (bot, connection, spawner) = setup();
    bot.command("ping", |c: Conversation| async move {
        let _ = c.reply("pong").await;
    }).unwrap();

    bot.process(Message::new("C1", "U2", "<@U1> ping")).await;
    bot.process(Message::new("D1", "U3", "ping").with_channel_kind(ChannelKind::Direct)).await;
    spawner.run_until_idle().await;

    assert_eq!(texts(&connection), ["<@U2>: pong", "pong"]);
}

#[tokio::test]
async fn test_link_markup_is_stripped_before_matching() {
    let (bot, connection, spawner) = setup();
    bot.command("open {url}", |c: Conversation| async move {
        let url = c.param("url").unwrap_or_default().to_string();
        let _ = c.say(url).await;
    }).unwrap();

    bot.process(Message::new("C1", "U2", "!open <https://example.com|example.com>")).await;
    spawner.run_until_idle().await;

    assert_eq!(texts(&connection), ["example.com"]);
}

#[tokio::test]
async fn test_listen_runs_until_stream_ends() {
    let (bot, connection, spawner) = setup();
    bot.command("ping", |c: Conversation| async move {
        let _ = c.say("pong").await;
    }).unwrap();

    for _ in 0..3 {
        connection.push(Message::new("C1", "U2", "!ping"));
    }
    connection.push_malformed("truncated frame");

    bot.listen().await;
    assert_eq!(spawner.pending(), 3);

    assert_eq!(spawner.run_until_idle().await, 6);
    assert_eq!(texts(&connection), ["pong", "pong", "pong"]);
}
