//! Month of bursary work: billing, payments in both currencies, cashbook and reports
//!
//! Pass a TOML settings file as the first argument to override the defaults.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use school_ledger::utils::{init_logging, MemoryStorage};
use school_ledger::{
    load_config, patterns, CashbookQuery, Currency, FeeType, Ledger, LedgerConfig,
    PaymentMethod, PaymentRequest, PaymentTimeline, Period, Term,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => load_config(path)?,
        None => LedgerConfig::default(),
    };
    init_logging(&config.logging)?;

    println!("School Ledger - Cashbook Example\n");

    let mut ledger = Ledger::with_config(MemoryStorage::new(), config)?;
    let march = |day| NaiveDate::from_ymd_opt(2024, 3, day).ok_or("invalid date");

    // 1. Students and the term bill
    for (id, name, class) in [
        ("S001", "Tariro Moyo", "Form 1"),
        ("S002", "Rudo Ncube", "Form 3"),
    ] {
        ledger
            .register_student(id, name, Some(class.to_string()), BigDecimal::from(0), BigDecimal::from(0))
            .await?;
    }

    let term = Term::new(
        "2024-T1",
        "First term",
        march(1)?,
        NaiveDate::from_ymd_opt(2024, 4, 30).ok_or("invalid date")?,
        BigDecimal::from(100),
        BigDecimal::from(350),
    )?;
    let term = ledger.add_term(term).await?;
    let billing = ledger.bill_term(&term.id).await?;
    println!(
        "Billed {} students: levy {} USD, tuition {} USD",
        billing.billed.len(),
        billing.levy_charged,
        billing.tuition_charged
    );

    // 2. Rates and payments
    ledger.set_exchange_rate(march(1)?, BigDecimal::from(3500)).await?;
    ledger.set_exchange_rate(march(4)?, BigDecimal::from(3600)).await?;

    let payments = [
        PaymentRequest::new("S001", FeeType::Levy, Currency::Zwg, BigDecimal::from(35000), march(1)?)
            .reference("RCPT-0001")
            .account("cbz-zwg"),
        PaymentRequest::new("S001", FeeType::Tuition, Currency::Usd, BigDecimal::from(200), march(1)?)
            .method(PaymentMethod::Cash),
        PaymentRequest::new("S002", FeeType::Levy, Currency::Usd, BigDecimal::from(100), march(4)?)
            .account("cbz-usd")
            .method(PaymentMethod::Transfer),
        PaymentRequest::new("S002", FeeType::Tuition, Currency::Zwg, BigDecimal::from(72000), march(4)?)
            .timeline(PaymentTimeline::Prepayment),
    ];
    for request in payments {
        let receipt = ledger.record_payment(request).await?;
        println!(
            "  {} paid {} {} -> {} USD, {} owing {}",
            receipt.transaction.student_id.as_deref().unwrap_or("?"),
            receipt.transaction.amount_or_zero(),
            receipt.transaction.currency,
            receipt.base_amount,
            receipt.transaction.fee_type.map(|f| f.label()).unwrap_or("fee"),
            receipt.new_balance()
        );
    }

    match ledger
        .record_payment(PaymentRequest::new(
            "S002",
            FeeType::Levy,
            Currency::Zwg,
            BigDecimal::from(1000),
            march(2)?,
        ))
        .await
    {
        Ok(_) => println!("  unexpected: payment without a rate was accepted"),
        Err(e) => println!("  rejected: {e}"),
    }

    // 3. Other cashbook entries
    ledger
        .record_transaction(patterns::bank_deposit(march(5)?, BigDecimal::from(250), Currency::Usd, "cbz-usd", "donations", "PTA")?)
        .await?;
    ledger
        .record_transaction(patterns::bank_payment(march(6)?, BigDecimal::from(80), Currency::Usd, "cbz-usd", "utilities", "ZESA")?)
        .await?;
    ledger
        .record_transaction(patterns::petty_cash(march(6)?, BigDecimal::from(12), "stationery", "Chalk and registers")?)
        .await?;

    // 4. USD cashbook for March
    let period = Period::month(2024, 3)?;
    let cashbook = ledger
        .cashbook(CashbookQuery::new(period).currency(Currency::Usd))
        .await?;

    println!("\nUSD cashbook {} to {}", period.start(), period.end());
    println!("{:<28} | {:<28}", "Incoming", "Outgoing");
    let cell = |t: Option<&school_ledger::Transaction>| match t {
        Some(t) => format!(
            "{} {:<12} {:>8}",
            t.date.format("%d/%m"),
            t.category.as_deref().unwrap_or("-"),
            t.amount_or_zero()
        ),
        None => String::new(),
    };
    for row in cashbook.rows() {
        println!("{:<28} | {:<28}", cell(row.incoming), cell(row.outgoing));
    }
    for (label, side) in [("In", &cashbook.incoming), ("Out", &cashbook.outgoing)] {
        let columns: Vec<String> = side
            .totals
            .to_flat_map()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        println!("{label}: {}", columns.join(", "));
    }
    println!("Net movement: {}", cashbook.net());

    // 5. Reports
    let collections = ledger.collection_report(period).await?;
    for fee in [FeeType::Levy, FeeType::Tuition] {
        let collected = collections.fee(fee);
        println!(
            "{fee}: {} USD + {} ZWG = {} USD equivalent",
            collected.in_currency(Currency::Usd),
            collected.in_currency(Currency::Zwg),
            collected.base_total
        );
    }

    let audit = ledger.audit_conversions(period).await?;
    println!(
        "Audit: {} payments checked, {} issues",
        audit.payments_checked,
        audit.issues.len()
    );

    Ok(())
}
