use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use physio_coach::config::AppConfig;
use physio_coach::feedback::{
    ChannelSettings, FeedbackChannel, FeedbackCommand, FeedbackDispatcher, FeedbackSink,
    HapticClient,
};
use physio_coach::pose::Side;

/// Accepts `count` requests and forwards each request's body.
fn actuator(count: usize) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for _ in 0..count {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let mut request = Vec::new();
            let mut buf = [0u8; 512];
            while let Ok(read) = stream.read(&mut buf) {
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..read]);
                if request.ends_with(b"}") {
                    break;
                }
            }
            let _ = stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            let text = String::from_utf8_lossy(&request).into_owned();
            let body = text.split("\r\n\r\n").nth(1).unwrap_or_default().to_string();
            let _ = tx.send(body);
        }
    });
    (format!("http://{addr}"), rx)
}

#[test]
fn vibrate_command_reaches_the_actuator() {
    let (host, bodies) = actuator(1);
    let haptic = FeedbackChannel::spawn(
        "haptic",
        ChannelSettings {
            capacity: 50,
            poll_interval: Duration::from_millis(50),
        },
        move || HapticClient::new(&host, Duration::from_millis(500)),
    )
    .unwrap();
    let mut dispatcher =
        FeedbackDispatcher::with_channels(None, Some(haptic), Duration::from_secs(1));

    dispatcher.submit(FeedbackCommand::vibrate(Side::Right, 250, 255));
    let body = bodies.recv_timeout(Duration::from_secs(3)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["action"], "on");
    assert_eq!(json["side"], "RIGHT");
    assert_eq!(json["duration_ms"], 250);
    assert_eq!(json["intensity"], 255);
    dispatcher.shutdown();
}

#[test]
fn unreachable_actuator_never_blocks_the_caller() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let host = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let mut config = AppConfig::default();
    config.speech.enabled = false;
    config.haptic.host = host;
    config.haptic.timeout_ms = 100;
    config.shutdown_timeout_ms = 1_000;
    let mut dispatcher = FeedbackDispatcher::from_config(&config);
    assert!(dispatcher.haptic_enabled());
    assert!(!dispatcher.speech_enabled());

    let started = Instant::now();
    for _ in 0..500 {
        dispatcher.submit(FeedbackCommand::vibrate(Side::Both, 250, 255));
        dispatcher.submit(FeedbackCommand::speak("GOOD"));
    }
    assert!(started.elapsed() < Duration::from_millis(500));

    let shutdown = Instant::now();
    dispatcher.shutdown();
    assert!(shutdown.elapsed() < Duration::from_secs(2));
}
