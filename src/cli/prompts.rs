//! Interactive prompts using dialoguer

use anyhow::Result;
use dialoguer::{Input, Select};

use super::args::PredictArgs;
use crate::error::RiskError;
use crate::pipeline::schema::{
    ApplicantRecord, AGE, CHECKING_ACCOUNT, CHECKING_VALUES, CREDIT_AMOUNT, DURATION,
    HOUSING, HOUSING_VALUES, JOB, PURPOSE, PURPOSE_VALUES, SAVING_ACCOUNTS, SAVING_VALUES, SEX,
    SEX_VALUES,
};

const JOB_DESCRIPTIONS: [&str; 4] = [
    "0 - Unskilled / Non-resident",
    "1 - Unskilled / Resident",
    "2 - Skilled",
    "3 - Highly Skilled",
];

fn prompt_select(prompt: &str, options: &[&str]) -> Result<String> {
    let index = Select::new()
        .with_prompt(prompt)
        .items(options)
        .default(0)
        .interact()?;
    Ok(options[index].to_string())
}

fn prompt_integer(prompt: &str, default: i64, min: i64, max: i64) -> Result<i64> {
    let value = Input::<i64>::new()
        .with_prompt(format!("{} ({}-{})", prompt, min, max))
        .default(default)
        .validate_with(move |v: &i64| -> Result<(), String> {
            if (min..=max).contains(v) {
                Ok(())
            } else {
                Err(format!("must be between {} and {}", min, max))
            }
        })
        .interact_text()?;
    Ok(value)
}

fn prompt_amount(prompt: &str, default: f64, min: f64, max: f64) -> Result<f64> {
    let value = Input::<f64>::new()
        .with_prompt(format!("{} ({}-{})", prompt, min, max))
        .default(default)
        .validate_with(move |v: &f64| -> Result<(), String> {
            if (min..=max).contains(v) {
                Ok(())
            } else {
                Err(format!("must be between {} and {}", min, max))
            }
        })
        .interact_text()?;
    Ok(value)
}

/// Names of applicant fields not supplied as flags, in column order
pub fn missing_fields(args: &PredictArgs) -> Vec<String> {
    [
        (AGE, args.age.is_none()),
        (SEX, args.sex.is_none()),
        (JOB, args.job.is_none()),
        (HOUSING, args.housing.is_none()),
        (SAVING_ACCOUNTS, args.saving_accounts.is_none()),
        (CHECKING_ACCOUNT, args.checking_account.is_none()),
        (CREDIT_AMOUNT, args.credit_amount.is_none()),
        (DURATION, args.duration.is_none()),
        (PURPOSE, args.purpose.is_none()),
    ]
    .into_iter()
    .filter(|(_, missing)| *missing)
    .map(|(name, _)| name.to_string())
    .collect()
}

/// Build an applicant from field flags, prompting for anything omitted
///
/// With `--no-prompt`, omitted fields are an error listing all of them.
pub fn collect_applicant(args: &PredictArgs) -> Result<ApplicantRecord> {
    let missing = missing_fields(args);
    if args.no_prompt && !missing.is_empty() {
        return Err(RiskError::InferenceShape { missing }.into());
    }

    let age = match args.age {
        Some(v) => v,
        None => prompt_integer("Age", 32, 18, 80)?,
    };
    let sex = match &args.sex {
        Some(v) => v.clone(),
        None => prompt_select("Gender", &SEX_VALUES)?,
    };
    let job = match args.job {
        Some(v) => v,
        None => Select::new()
            .with_prompt("Job Skill Level")
            .items(&JOB_DESCRIPTIONS)
            .default(2)
            .interact()? as i64,
    };
    let housing = match &args.housing {
        Some(v) => v.clone(),
        None => prompt_select("Housing Status", &HOUSING_VALUES)?,
    };
    let saving_accounts = match &args.saving_accounts {
        Some(v) => v.clone(),
        None => prompt_select("Saving Accounts", &SAVING_VALUES)?,
    };
    let checking_account = match &args.checking_account {
        Some(v) => v.clone(),
        None => prompt_select("Checking Account", &CHECKING_VALUES)?,
    };
    let credit_amount = match args.credit_amount {
        Some(v) => v,
        None => prompt_amount("Credit Amount (DM)", 2500.0, 100.0, 20_000.0)?,
    };
    let duration = match args.duration {
        Some(v) => v,
        None => prompt_integer("Loan Duration (months)", 18, 1, 72)?,
    };
    let purpose = match &args.purpose {
        Some(v) => v.clone(),
        None => prompt_select("Purpose of Loan", &PURPOSE_VALUES)?,
    };

    Ok(ApplicantRecord {
        age,
        sex,
        job,
        housing,
        saving_accounts,
        checking_account,
        credit_amount,
        duration,
        purpose,
    })
}
