//! Network block example
//!
//! Run with: cargo run -p ipcalc-cidr --example block_info

use ipcalc_cidr::NetworkBlock;
use std::net::Ipv4Addr;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("ipcalc - Network Block Example\n");

    let block: NetworkBlock = "192.168.1.10/24".parse()?;

    println!("Block: {}", block);
    println!("─────────────────────────────");
    println!("Network:       {}", block.network());
    println!("Broadcast:     {}", block.broadcast());
    println!("Wildcard:      {}", block.wildcard_mask());
    println!("First usable:  {}", block.first_usable());
    println!("Last usable:   {}", block.last_usable());
    println!("Total IPs:     {}", block.subnet_size());
    println!("Usable hosts:  {}", block.usable_hosts());

    println!("\nChecking containment:");
    let inside = Ipv4Addr::new(192, 168, 1, 100);
    let outside = Ipv4Addr::new(192, 168, 2, 1);
    println!("{} in range? {}", inside, block.contains(inside));
    println!("{} in range?   {}", outside, block.contains(outside));

    println!("\nSplit into 4:");
    for (i, subnet) in block.subdivide(4)?.iter().enumerate() {
        println!(
            "  {}: {} hosts {}-{}",
            i + 1,
            subnet.to_cidr_string(),
            subnet.first_usable(),
            subnet.last_usable()
        );
    }

    Ok(())
}
