use formwatch_exec::generate::CouponGenerator;
use serde::Serialize;

use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::OutputArgs;

#[derive(Serialize)]
struct CouponResult {
    codes: Vec<String>,
}

pub async fn coupon_cmd(count: usize, seed: Option<u64>, output: OutputArgs) -> i32 {
    let generator = match seed {
        Some(seed) => CouponGenerator::with_seed(seed),
        None => CouponGenerator::new(),
    };

    let codes: Result<Vec<String>, _> = (0..count).map(|_| generator.generate_code()).collect();
    let codes = match codes {
        Ok(c) => c,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::INFRASTRUCTURE_ERROR;
        }
    };

    if output.format == OutputFormat::Text && !output.quiet {
        for code in &codes {
            println!("{code}");
        }
    } else {
        print_result(output.format, output.quiet, &CouponResult { codes });
    }
    exit_codes::SUCCESS
}
