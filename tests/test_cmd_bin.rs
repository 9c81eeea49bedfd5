use std::io::Write;
use std::process::{Command, Stdio};

const SCRIPT: &str = "1
1
1
7
Ann
0123456789
1 Main St
6
2
1

Fridge
1000
6
3
1
7
1

200
4
1
300
4
1
600
7
4
3
";

#[test]
fn test_installments_binary() {
    let bin_path = env!("CARGO_BIN_EXE_installments");
    let workdir = tempfile::tempdir().expect("Failed to create temporary directory");

    let mut child = Command::new(bin_path)
        .current_dir(workdir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute binary");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(SCRIPT.as_bytes())
        .expect("Failed to write script");
    let output = child.wait_with_output().expect("Failed to wait for binary");

    assert!(
        output.status.success(),
        "Binary failed with stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("✓ Customer Ann added with ID 7"), "{stdout}");
    assert!(stdout.contains("✓ Product Fridge added with ID 1"), "{stdout}");
    assert!(stdout.contains("✓ Installment 1 created. Remaining amount: 800.00"), "{stdout}");
    assert!(stdout.contains("✓ Payment recorded. Paid: 500.00, Remaining: 500.00"), "{stdout}");
    assert!(stdout.contains("✗ Payment 600.00 exceeds remaining balance 500.00"), "{stdout}");

    let installments =
        std::fs::read_to_string(workdir.path().join("data").join("installments.csv")).unwrap();
    assert!(installments.ends_with("1,7,1,1000.00,500.00,500.00\n"));
}
