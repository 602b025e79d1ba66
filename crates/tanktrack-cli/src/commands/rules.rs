use uuid::Uuid;

use tanktrack_core::model::{
    AssetColumn, ColumnKind, Combinator, Condition, ConditionValue, Operator, RemainingLife, Rule,
    RuleOutcome,
};

use crate::app::AppContext;
use crate::cli::{RuleAddArgs, RuleCommands};

pub fn handle(ctx: &AppContext, command: &RuleCommands) -> anyhow::Result<()> {
    match command {
        RuleCommands::List => handle_list(ctx),
        RuleCommands::Add(args) => handle_add(ctx, args),
        RuleCommands::Delete(args) => handle_delete(ctx, &args.id),
    }
}

fn handle_list(ctx: &AppContext) -> anyhow::Result<()> {
    let repo = ctx.open_repository()?;
    let rules = repo.snapshot().rules;
    if rules.is_empty() {
        if !ctx.quiet {
            println!("No rules defined");
        }
        return Ok(());
    }
    for rule in &rules {
        println!("{}  {}", rule.id, rule.render());
    }
    Ok(())
}

fn handle_add(ctx: &AppContext, args: &RuleAddArgs) -> anyhow::Result<()> {
    let column: AssetColumn = args.column.parse()?;
    let operator: Operator = args.operator.parse()?;
    let value = parse_value(column, &args.value)?;

    let outcome = match (&args.recommend, &args.life) {
        (Some(text), None) => RuleOutcome::Recommendation { text: text.clone() },
        (None, Some(band)) => RuleOutcome::RemainingLife {
            band: band.parse::<RemainingLife>()?,
        },
        _ => anyhow::bail!("Exactly one of --recommend or --life is required"),
    };

    let rule = Rule {
        id: format!("RULE-{}", Uuid::new_v4()),
        conditions: vec![Condition {
            column,
            operator,
            value,
        }],
        combinator: Combinator::And,
        outcome,
    };
    rule.validate()?;

    let repo = ctx.open_repository()?;
    let rendered = rule.render();
    let rule_id = rule.id.clone();
    repo.update_rules(|rules| {
        rules.push(rule);
        Ok(())
    })?;
    if ctx.quiet {
        println!("{rule_id}");
    } else {
        println!("Added rule {rule_id}");
        println!("  {rendered}");
    }
    Ok(())
}

fn handle_delete(ctx: &AppContext, id: &str) -> anyhow::Result<()> {
    let repo = ctx.open_repository()?;
    let mut removed = false;
    repo.update_rules(|rules| {
        let before = rules.len();
        rules.retain(|rule| rule.id != id);
        removed = rules.len() != before;
        Ok(())
    })?;
    if !removed {
        anyhow::bail!("No rule with id '{id}'");
    }
    if !ctx.quiet {
        println!("Deleted rule {id}");
    }
    Ok(())
}

/// Interpret the raw flag value for the column it will be compared with.
/// Numeric columns require a number; everything else is kept as text.
fn parse_value(column: AssetColumn, raw: &str) -> anyhow::Result<ConditionValue> {
    match column.kind() {
        ColumnKind::Numeric => {
            let number: f64 = raw.parse().map_err(|_| {
                anyhow::anyhow!("Column {} needs a numeric value, got '{raw}'", column)
            })?;
            Ok(ConditionValue::Number(number))
        }
        ColumnKind::Enumerated | ColumnKind::Text => Ok(ConditionValue::Text(raw.to_string())),
    }
}
