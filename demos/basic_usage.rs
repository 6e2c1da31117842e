use opstack_errors::{
    encode_http_error, encode_rpc_error, fail, wrap, Kind, Op, Result, Severity, Stack,
};

fn read_profile(user: &str) -> Result<String> {
    // Simulate a storage miss
    if user == "ghost" {
        return Err(fail!(format!("no profile for {}", user), Kind::NOT_FOUND));
    }
    Ok(format!("profile:{}", user))
}

fn render_page(user: &str) -> Result<String> {
    read_profile(user).map_err(|e| wrap!(e, Op::from("web.RenderPage"), "page unavailable", Severity::Warn))
}

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    println!("--- Basic Usage Example ---\n");

    match render_page("ghost") {
        Ok(page) => println!("Rendered {}", page),
        Err(err) => {
            // 1. The rendered chain, root-first
            println!("1. [RENDERED]\n   {}", err);

            // 2. What leaves the process at each boundary
            let status = encode_rpc_error(&err);
            let (http, _) = encode_http_error(&err);
            println!("\n2. [EGRESS]\n   gRPC {:?}, HTTP {}", status.code(), http);

            // 3. Structured projection for log pipelines
            let stack = Stack::capture(&err);
            match serde_json::to_string_pretty(&stack) {
                Ok(json) => println!("\n3. [STACK]\n{}", json),
                Err(e) => eprintln!("cannot serialize stack: {}", e),
            }

            // 4. One tracing event at the node's severity
            println!("\n4. [TRACING]");
            err.log_view().emit();
        }
    }
}
