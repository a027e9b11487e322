// examples/transceiver_events.rs
//
// An event source publishes hot-swap notifications through a writer registry
// to two independent consumers, each running the standard consumer loop.

use stratum_channel::{run_consumer, Channel, ChannelConfig, ConsumerExit, RegistryConfig, WriterRegistry};
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
enum HwState {
  Present,
  NotPresent,
}

#[derive(Debug, Clone)]
struct TransceiverEvent {
  slot: i32,
  port: i32,
  state: HwState,
}

fn main() {
  let _ = stratum_logging::init_default();

  let config = ChannelConfig {
    max_depth: 16,
    read_timeout: Some(Duration::from_millis(100)),
  };
  let registry = Arc::new(WriterRegistry::<TransceiverEvent>::new(RegistryConfig::default()));
  let stop = Arc::new(AtomicBool::new(false));

  // Consumer 1: the port manager, closed explicitly at shutdown.
  let port_channel: Arc<Channel<TransceiverEvent>> = config.build();
  let port_reader = port_channel.reader().expect("fresh channel is open");
  registry
    .register(port_channel.writer().expect("fresh channel is open"), 10)
    .expect("register port manager");

  // Consumer 2: an LED controller that stops on the shared flag.
  let led_channel: Arc<Channel<TransceiverEvent>> = config.build();
  let led_reader = led_channel.reader().expect("fresh channel is open");
  let led_id = registry
    .register(led_channel.writer().expect("fresh channel is open"), 1)
    .expect("register led controller");

  let timeout = config.read_timeout.unwrap_or(Duration::from_secs(1));
  let port_task = thread::spawn(move || {
    run_consumer(&port_reader, timeout, || false, |event: TransceiverEvent| {
      println!("[port manager] slot {} port {} -> {:?}", event.slot, event.port, event.state);
      ControlFlow::Continue(())
    })
  });
  let led_stop = Arc::clone(&stop);
  let led_task = thread::spawn(move || {
    run_consumer(&led_reader, timeout, || led_stop.load(Ordering::SeqCst), |event: TransceiverEvent| {
      let on = event.state == HwState::Present;
      println!("[led] port {} led {}", event.port, if on { "green" } else { "off" });
      ControlFlow::Continue(())
    })
  });

  for port in 1..=4 {
    let state = if port % 2 == 0 { HwState::NotPresent } else { HwState::Present };
    let report = registry.publish(&TransceiverEvent { slot: 1, port, state });
    println!("[source] published to {} of {} writers", report.delivered, report.attempted());
    thread::sleep(Duration::from_millis(20));
  }

  registry.unregister(led_id).expect("led controller registered");
  stop.store(true, Ordering::SeqCst);
  port_channel.close();

  let port_exit: ConsumerExit = port_task.join().expect("port manager panicked");
  let led_exit: ConsumerExit = led_task.join().expect("led controller panicked");
  println!("[main] port manager: {:?}", port_exit);
  println!("[main] led controller: {:?}", led_exit);

  // The closed channel is pruned from the registry on the next publish.
  let report = registry.publish(&TransceiverEvent { slot: 1, port: 5, state: HwState::Present });
  assert_eq!(report.cancelled, 1);
  assert!(registry.is_empty());
}
