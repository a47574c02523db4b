//! Template contexts built from report payloads.

use std::collections::BTreeMap;

use chrono::Local;
use serde_json::{Map, Value};
use tracing::debug;

use crate::invoice::rules::{format_br, normalize_month_reference, parse_br_amount};

/// Flat placeholder name to rendered value mapping.
pub type TemplateContext = BTreeMap<String, String>;

const DEFAULT_PRICE_KWH: f64 = 0.85;

/// Numeric value of a payload entry.
///
/// Payloads carry JSON numbers, machine decimals (`"327.84"`) or invoice
/// strings (`"327,84"`); machine decimals are read as such before falling
/// back to invoice normalization.
fn amount(data: &Map<String, Value>, key: &str) -> f64 {
    match data.get(key) {
        Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Some(Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => parse_br_amount(s),
        },
        _ => 0.0,
    }
}

/// Amount with a default for missing or zero entries.
fn amount_or(data: &Map<String, Value>, key: &str, default: f64) -> f64 {
    match amount(data, key) {
        v if v == 0.0 => default,
        v => v,
    }
}

fn text(data: &Map<String, Value>, key: &str) -> String {
    match data.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn first_text(data: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .map(|k| text(data, k))
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

fn objects<'a>(data: &'a Map<String, Value>, key: &str) -> impl Iterator<Item = &'a Map<String, Value>> {
    data.get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

fn insert(ctx: &mut TemplateContext, key: &str, value: impl Into<String>) {
    ctx.insert(key.to_string(), value.into());
}

/// Context of a single customer invoice.
pub fn invoice_context(data: &Map<String, Value>) -> TemplateContext {
    let scee = amount(data, "consumoScee");
    let non_compensated = amount(data, "consumoNaoCompensado");
    let billed_total = amount(data, "valorTotal");
    let with_discount = amount(data, "valorComDesconto");
    let without_discount = amount(data, "valorSemDesconto");
    let savings = amount(data, "economia");
    let price_kwh = amount_or(data, "precoKwh", DEFAULT_PRICE_KWH);
    let wire_b_price = amount(data, "precoFioB");

    let energy_kwh = scee + non_compensated;
    let energy_value = energy_kwh * price_kwh;

    // Taxa minima: billed total minus non-compensated energy and wire B
    let wire_b_value = scee * wire_b_price;
    let non_compensated_value = non_compensated * price_kwh;
    let minimum_fee = billed_total - (non_compensated_value + wire_b_value);

    debug!(
        "Taxa minima = {:.2} - ({:.2} + {:.2}) = {:.2}",
        billed_total, non_compensated_value, wire_b_value, minimum_fee
    );

    let mut ctx = TemplateContext::new();
    insert(&mut ctx, "nome_cliente", text(data, "nomeCliente"));
    insert(
        &mut ctx,
        "endereco_cliente",
        first_text(data, &["enderecoCliente", "endereco"]),
    );
    insert(&mut ctx, "unidade_consumidora", text(data, "unidadeConsumidora"));
    insert(
        &mut ctx,
        "conta_mes",
        normalize_month_reference(&text(data, "mesReferencia")),
    );
    insert(&mut ctx, "vencimento", text(data, "dataVencimento"));
    insert(&mut ctx, "total_a_pagar", format_br(with_discount));
    insert(&mut ctx, "valor_total", format_br(without_discount));
    insert(&mut ctx, "sem_solar", format_br(without_discount));
    insert(&mut ctx, "desconto", format_br(savings));
    insert(
        &mut ctx,
        "linha_desconto",
        if savings > 0.0 {
            format!("Desconto solar: - R$ {}", format_br(savings))
        } else {
            String::new()
        },
    );
    insert(&mut ctx, "energia_ativa_quantidade", format_br(energy_kwh));
    insert(&mut ctx, "energia_ativa_preco_unitario", format_br(price_kwh));
    insert(&mut ctx, "energia_ativa_valor", format_br(energy_value));
    insert(&mut ctx, "taxa_minima", format_br(minimum_fee));
    ctx
}

/// Context of a customer's multi-month savings summary.
pub fn client_summary_context(data: &Map<String, Value>) -> TemplateContext {
    let rows: Vec<String> = objects(data, "faturas")
        .map(|invoice| {
            format!(
                "{}  |  {} kWh  |  R$ {}  |  R$ {}  |  R$ {}",
                text(invoice, "mes"),
                format_br(amount(invoice, "consumoScee")),
                format_br(amount(invoice, "valorSemDesconto")),
                format_br(amount(invoice, "valorComDesconto")),
                format_br(amount(invoice, "economia")),
            )
        })
        .collect();

    let mut ctx = TemplateContext::new();
    insert(&mut ctx, "nome_cliente", text(data, "nomeCliente"));
    insert(
        &mut ctx,
        "endereco_completo",
        first_text(data, &["enderecoCompleto", "endereco"]),
    );
    insert(&mut ctx, "unidade_consumidora", text(data, "unidadeConsumidora"));
    insert(&mut ctx, "periodo", text(data, "periodo"));
    insert(
        &mut ctx,
        "desconto_percentual",
        format_br(amount(data, "descontoPercentual")),
    );
    insert(&mut ctx, "economia_total", format_br(amount(data, "economiaTotal")));
    insert(
        &mut ctx,
        "valor_sem_desconto_total",
        format_br(amount(data, "valorSemDescontoTotal")),
    );
    insert(
        &mut ctx,
        "valor_com_desconto_total",
        format_br(amount(data, "valorComDescontoTotal")),
    );
    insert(&mut ctx, "num_meses", rows.len().to_string());
    insert(&mut ctx, "faturas", rows.join("\n"));
    ctx
}

/// Context of a plant-level report over all clients it credits.
pub fn plant_report_context(data: &Map<String, Value>) -> TemplateContext {
    let mut totals = [0.0f64; 5];
    let mut rows = Vec::new();

    for client in objects(data, "clientes") {
        let figures = [
            amount(client, "consumo"),
            amount(client, "valorComDesconto"),
            amount(client, "valorTotal"),
            amount(client, "lucro"),
            amount(client, "saldoKwh"),
        ];
        for (total, value) in totals.iter_mut().zip(figures) {
            *total += value;
        }

        let [consumption, with_discount, utility_total, profit, balance] = figures;
        rows.push(format!(
            "{}  {}  UC {}  {}  |  {}%  |  {} kWh  |  R$ {}  |  R$ {}  |  R$ {}  |  {} kWh",
            text(client, "numeroContrato"),
            text(client, "nome"),
            text(client, "uc"),
            text(client, "endereco"),
            format_br(amount(client, "porcentagemEnvioCredito")),
            format_br(consumption),
            format_br(with_discount),
            format_br(utility_total),
            format_br(profit),
            format_br(balance),
        ));
    }

    let generated = amount(data, "kwhGerado");
    let predicted = amount_or(data, "kwhPrevisto", 1.0);
    let percentage = if predicted > 0.0 {
        generated / predicted * 100.0
    } else {
        0.0
    };
    let or_dash = |v: f64| if v > 0.0 { format_br(v) } else { "-".to_string() };

    let mut ctx = TemplateContext::new();
    insert(&mut ctx, "nome_usina", text(data, "nomeUsina"));
    insert(&mut ctx, "potencia_kwp", or_dash(amount(data, "potenciaKwp")));
    insert(
        &mut ctx,
        "kwh_previsto_mensal",
        or_dash(amount(data, "kwhPrevistoMensal")),
    );
    insert(&mut ctx, "periodo", text(data, "periodo"));
    insert(&mut ctx, "kwh_gerado", format_br(generated));
    insert(&mut ctx, "percentual_gerado", format_br(percentage));
    insert(&mut ctx, "clientes", rows.join("\n"));
    insert(&mut ctx, "num_clientes", rows.len().to_string());
    insert(&mut ctx, "total_consumo", format_br(totals[0]));
    insert(&mut ctx, "total_valor_com_desconto", format_br(totals[1]));
    insert(&mut ctx, "total_equatorial", format_br(totals[2]));
    insert(&mut ctx, "total_lucro", format_br(totals[3]));
    insert(&mut ctx, "total_saldo_kwh", format_br(totals[4]));
    insert(
        &mut ctx,
        "data_emissao",
        Local::now().format("%d/%m/%Y às %H:%M").to_string(),
    );
    ctx
}
