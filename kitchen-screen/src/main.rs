use std::sync::Arc;

use kitchen_screen::{
    ApiForwarder, KitchenScreen, MessageBus, TracingNotifier, UserNotifier, WaiterStation,
    print_banner, setup_environment,
};
use shared::order::{DisplayOrder, KitchenState, PosOrder};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "commands: send <pos order json> | done <id> | stage draft|completed | show | counters | quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 配置, 日志)
    let config = setup_environment()?;

    print_banner();
    tracing::info!(shop_id = config.shop_id, "Kitchen screen starting...");

    // 2. 总线与两端
    let bus = MessageBus::with_capacity(config.bus_capacity);
    let notifier: Arc<dyn UserNotifier> = Arc::new(TracingNotifier);

    let mut screen = KitchenScreen::new(config.shop_id, bus.clone(), notifier.clone());
    let mut waiter = WaiterStation::new(config.shop_id, bus.clone(), notifier)
        .with_forwarder(ApiForwarder::from_config(&config)?);

    screen.start();
    waiter.start();

    println!("{}", HELP);

    // 3. 命令循环
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, shutting down");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !run_command(line.trim(), &mut screen, &waiter) {
                    break;
                }
            }
        }
    }

    // 4. 关闭
    waiter.stop().await;
    screen.stop().await;
    bus.shutdown();

    Ok(())
}

/// Returns `false` when the loop should end
fn run_command(line: &str, screen: &mut KitchenScreen, waiter: &WaiterStation) -> bool {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    match command {
        "" => {}
        "send" => match serde_json::from_str::<PosOrder>(rest) {
            Ok(order) => {
                if let Err(e) = waiter.send_order_in_preparation(&order) {
                    tracing::error!(error = %e, "Failed to send order");
                }
            }
            Err(e) => println!("invalid order: {}", e),
        },
        "done" => match rest.trim().parse::<u64>() {
            Ok(id) => {
                if screen.complete_order(id).is_none() {
                    println!("no open kitchen order #{}", id);
                }
            }
            Err(_) => println!("usage: done <id>"),
        },
        "stage" => match rest.parse::<KitchenState>() {
            Ok(stage) => screen.select_stage(stage),
            Err(e) => println!("{}", e),
        },
        "show" => {
            for order in screen.visible_orders() {
                print_order(&order);
            }
        }
        "counters" => {
            let counters = screen.counters();
            println!(
                "draft: {}  waiting: {}  ready: {}",
                counters.draft_count, counters.waiting_count, counters.ready_count
            );
        }
        "quit" | "exit" => return false,
        _ => println!("{}", HELP),
    }
    true
}

fn print_order(order: &DisplayOrder) {
    println!(
        "#{} {} table {} [{}]",
        order.kitchen_order_id,
        order.pos_reference,
        order.table.as_deref().unwrap_or("-"),
        order.state
    );
    for line in &order.lines {
        println!("    {} x {}", line.qty, line.product_name);
    }
}
