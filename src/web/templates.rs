//! # Templates Maud — HTML Server-Side Rendering
//!
//! Páginas renderizadas com o macro [`maud`](https://maud.lambda.xyz/).
//! Sem JavaScript: o questionário é um `<form>` comum e o resultado é uma
//! página completa.
//!
//! ## Templates Disponíveis
//!
//! | Função | Rota | Descrição |
//! |--------|------|-----------|
//! | [`home_page()`] | `GET /` | Apresentação + deficiências cobertas |
//! | [`about_page()`] | `GET /sobre` | Método CF + regras da base |
//! | [`consultation_form()`] | `GET /consulta` | Questionário por categoria |
//! | [`result_page()`] | `POST /consulta` | Veredito, ranking e cálculo |
//! | [`insufficient_page()`] | `POST /consulta` | Nenhum sintoma informado |
//! | [`error_page()`] | — | Entrada rejeitada |
//!
//! ## Layout
//!
//! ```text
//! ┌──────────── nav-bar ────────────────┐
//! │ HD │ Início │ Consulta │ Sobre      │
//! ├─────────────────────────────────────┤
//! │            conteúdo                 │
//! └─────────────────────────────────────┘
//! ```

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::consultation::Consultation;
use crate::core::{EvidenceSet, KnowledgeBase, ANSWER_SCALE};
use crate::inference::{ResultClassifier, Verdict};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f6f7f2; color: #1f2a1f; }
.nav-bar { display: flex; gap: 1.5rem; align-items: center; padding: .8rem 2rem; background: #2f5d3a; }
.nav-bar a { color: #fff; text-decoration: none; }
.nav-brand { font-weight: 700; }
main { max-width: 960px; margin: 2rem auto; padding: 0 1rem; }
fieldset { border: 1px solid #c9d3c2; border-radius: 6px; margin-bottom: 1rem; }
.symptom-row { display: flex; justify-content: space-between; padding: .3rem 0; border-bottom: 1px dashed #e0e5da; }
table { border-collapse: collapse; width: 100%; }
th, td { text-align: left; padding: .4rem; border-bottom: 1px solid #dde3d6; }
.verdict { padding: 1rem; border-radius: 6px; margin-bottom: 1.5rem; }
.verdict.diagnosed { background: #e2f1e4; }
.verdict.inconclusive, .verdict.insufficient { background: #fdf3dc; }
.verdict.error { background: #fbe3e1; }
.steps { font-family: ui-monospace, monospace; font-size: .9rem; }
"#;

fn layout(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="pt-BR" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " — Diagnóstico de Deficiências" }
                style { (PreEscaped(STYLE)) }
            }
            body {
                nav class="nav-bar" {
                    a href="/" class="nav-brand" { "HD" }
                    a href="/" { "Início" }
                    a href="/consulta" { "Consulta" }
                    a href="/sobre" { "Sobre" }
                }
                main { (content) }
            }
        }
    }
}

/// Formata um CF com 4 casas decimais.
fn cf4(value: f64) -> String {
    format!("{:.4}", value)
}

/// Texto da escala correspondente a uma resposta, ou o próprio número.
fn answer_label(value: f64) -> String {
    ANSWER_SCALE
        .iter()
        .find(|option| option.value == value)
        .map(|option| option.label.to_string())
        .unwrap_or_else(|| cf4(value))
}

/// GET `/` — página inicial.
pub fn home_page(kb: &KnowledgeBase) -> Markup {
    layout(
        "Início",
        html! {
            h1 { "Diagnóstico de Deficiências Nutricionais" }
            p {
                "Sistema especialista que identifica a deficiência de nutriente mais "
                "provável a partir dos sintomas observados na planta, usando o método "
                "do fator de certeza."
            }
            p {
                (kb.symptom_count()) " sintomas, "
                (kb.deficiency_count()) " deficiências e "
                (kb.rule_count()) " regras do especialista."
            }
            ul {
                @for deficiency in kb.deficiencies() {
                    li { strong { (deficiency.code) } " " (deficiency.name) }
                }
            }
            p { a href="/consulta" { "Iniciar consulta →" } }
        },
    )
}

/// GET `/sobre` — explicação do método e regras da base.
pub fn about_page(kb: &KnowledgeBase, classifier: &ResultClassifier) -> Markup {
    layout(
        "Sobre",
        html! {
            h1 { "O método do fator de certeza" }
            p {
                "Cada regra do especialista associa um sintoma a uma deficiência com um "
                "fator de certeza (CF). A resposta do usuário pondera a regra:"
            }
            pre class="steps" { "cf_regra = cf_especialista × cf_usuário" }
            p { "As regras de uma mesma deficiência são combinadas duas a duas:" }
            pre class="steps" {
                "ambos ≥ 0 : cf = cf_old + cf_new × (1 − cf_old)\n"
                "ambos < 0 : cf = cf_old + cf_new × (1 + cf_old)\n"
                "sinais opostos : cf = (cf_old + cf_new) / (1 − min(|cf_old|, |cf_new|))"
            }
            p { "A ordem das regras não altera o resultado." }
            h2 { "Faixas de confiança" }
            table {
                thead { tr { th { "cf_final ≥" } th { "rótulo" } } }
                tbody {
                    @for band in classifier.bands().bands() {
                        tr { td { (format!("{:.1}", band.lower)) } td { (band.label) } }
                    }
                }
            }
            p {
                "Um diagnóstico só é apresentado quando o primeiro colocado atinge "
                (format!("{:.2}", classifier.actionable_threshold()))
                "."
            }
            h2 { "Regras do especialista" }
            table {
                thead { tr { th { "Deficiência" } th { "Sintoma" } th { "CF" } } }
                tbody {
                    @for rule in kb.rules() {
                        tr {
                            td { (rule.deficiency) }
                            td {
                                (rule.symptom) " "
                                (kb.symptom(&rule.symptom).map(|s| s.name.as_str()).unwrap_or_default())
                            }
                            td { (format!("{:.2}", rule.cf)) }
                        }
                    }
                }
            }
        },
    )
}

/// GET `/consulta` — questionário agrupado por categoria.
pub fn consultation_form(kb: &KnowledgeBase) -> Markup {
    layout(
        "Consulta",
        html! {
            h1 { "Consulta" }
            form method="post" action="/consulta" {
                fieldset {
                    legend { "Identificação (opcional)" }
                    label { "Nome " input type="text" name="name"; }
                    " "
                    label { "Idade " input type="number" name="age" min="0"; }
                }
                @for (category, symptoms) in kb.symptoms_by_category() {
                    fieldset {
                        legend { (category.label()) }
                        @for symptom in symptoms {
                            div class="symptom-row" {
                                label for=(symptom.code) {
                                    strong { (symptom.code) } " " (symptom.name)
                                }
                                select id=(symptom.code) name=(format!("symptoms[{}]", symptom.code)) {
                                    option value="" selected { "— não avaliado —" }
                                    @for option in &ANSWER_SCALE {
                                        option value=(option.value) { (option.label) }
                                    }
                                }
                            }
                        }
                    }
                }
                button type="submit" { "Diagnosticar" }
            }
        },
    )
}

/// POST `/consulta` — relatório da consulta.
pub fn result_page(consultation: &Consultation, evidence: &EvidenceSet) -> Markup {
    let kb = &consultation.knowledge_base;
    let report = &consultation.report;
    let deficiency_name = |code: &str| {
        kb.deficiency(code)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| code.to_string())
    };
    let symptom_name = |code: &str| {
        kb.symptom(code)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| code.to_string())
    };

    layout(
        "Resultado",
        html! {
            h1 { "Resultado da consulta" }
            @match &report.verdict {
                Verdict::Diagnosed { deficiency, cf_final, label } => {
                    div class="verdict diagnosed" {
                        h2 { (deficiency_name(deficiency)) }
                        p {
                            "Certeza: " strong { (format!("{:.2}%", cf_final.percentage())) }
                            " (" (label) ")"
                        }
                        @if let Some(d) = kb.deficiency(deficiency) {
                            h3 { "Recomendação" }
                            p { (d.remedy) }
                        }
                    }
                }
                Verdict::Inconclusive => {
                    div class="verdict inconclusive" {
                        h2 { "Nenhuma deficiência clara identificada" }
                        p { "Nenhuma hipótese atingiu o limiar de confiança." }
                    }
                }
            }

            h2 { "Sintomas informados" }
            table {
                thead { tr { th { "Código" } th { "Sintoma" } th { "Resposta" } } }
                tbody {
                    @for (code, value) in evidence.iter() {
                        tr { td { (code) } td { (symptom_name(code)) } td { (answer_label(value)) } }
                    }
                }
            }

            @if !report.ranked.is_empty() {
                h2 { "Ranking" }
                table {
                    thead {
                        tr { th { "#" } th { "Código" } th { "Deficiência" } th { "CF" } th { "%" } th { "Rótulo" } }
                    }
                    tbody {
                        @for (position, entry) in report.ranked.iter().enumerate() {
                            tr {
                                td { (position + 1) }
                                td { (entry.result.deficiency) }
                                td { (deficiency_name(&entry.result.deficiency)) }
                                td { (cf4(entry.result.cf_final.value())) }
                                td { (format!("{:.2}", entry.result.cf_final.percentage())) }
                                td { (entry.label) }
                            }
                        }
                    }
                }

                h2 { "Detalhes do cálculo" }
                @for entry in &report.ranked {
                    details {
                        summary {
                            (entry.result.deficiency) " — " (deficiency_name(&entry.result.deficiency))
                            " = " (cf4(entry.result.cf_final.value()))
                        }
                        h4 { "Regras usadas" }
                        ul class="steps" {
                            @for c in &entry.result.contributions {
                                li {
                                    (c.symptom) ": "
                                    (format!("{:.2} × {:.2} = {}", c.cf_expert, c.cf_user, cf4(c.cf_rule.value())))
                                }
                            }
                        }
                        @if !entry.result.steps.is_empty() {
                            h4 { "Combinação" }
                            ol class="steps" {
                                @for step in &entry.result.steps {
                                    li {
                                        (cf4(step.cf_old.value())) " ⊕ " (cf4(step.cf_new.value()))
                                        " = " (cf4(step.result.value()))
                                    }
                                }
                            }
                        }
                    }
                }
            }
            p { a href="/consulta" { "Nova consulta" } }
        },
    )
}

/// Nenhum sintoma respondido.
pub fn insufficient_page() -> Markup {
    layout(
        "Entrada insuficiente",
        html! {
            div class="verdict insufficient" {
                h2 { "Entrada insuficiente" }
                p { "Responda pelo menos um sintoma para obter um diagnóstico." }
            }
            p { a href="/consulta" { "Voltar ao questionário" } }
        },
    )
}

/// Entrada rejeitada (não numérica ou fora da faixa).
pub fn error_page(title: &str, message: &str) -> Markup {
    layout(
        title,
        html! {
            div class="verdict error" {
                h2 { (title) }
                p { (message) }
            }
            p { a href="/consulta" { "Voltar ao questionário" } }
        },
    )
}
