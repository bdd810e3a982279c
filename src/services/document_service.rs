// src/services/document_service.rs

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;
use serde_json::Value;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{ClientRepository, InterventionRepository},
    models::reports::InterventionReport,
};

#[derive(Clone)]
pub struct DocumentService {
    intervention_repo: InterventionRepository,
    client_repo: ClientRepository,
}

impl DocumentService {
    pub fn new(intervention_repo: InterventionRepository, client_repo: ClientRepository) -> Self {
        Self {
            intervention_repo,
            client_repo,
        }
    }

    // Renderiza o rapport aprovado em PDF, com um QR code da referência
    // para verificação no site.
    pub async fn generate_report_pdf(
        &self,
        pool: &PgPool,
        report: &InterventionReport,
    ) -> Result<Vec<u8>, AppError> {
        // 1. Busca os dados
        let intervention = self
            .intervention_repo
            .find_by_id(pool, report.intervention_id)
            .await?
            .ok_or(AppError::NotFound("intervention"))?;

        let client = self
            .client_repo
            .find_client_by_id(intervention.client_id)
            .await?
            .ok_or(AppError::NotFound("client"))?;

        // 2. Configura o PDF
        // Carrega a fonte da pasta 'fonts/'
        let font_family = genpdf::fonts::from_files("./fonts", "Roboto", None)
            .map_err(|_| AppError::FontNotFound("Fonte não encontrada na pasta ./fonts".to_string()))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(report.title.clone());
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO ---
        doc.push(
            elements::Paragraph::new(report.title.clone())
                .styled(style::Style::new().bold().with_font_size(18)),
        );
        doc.push(elements::Paragraph::new(format!(
            "Intervention {}",
            intervention.reference
        )));
        doc.push(elements::Paragraph::new(format!(
            "Client: {} ({})",
            client.name, client.client_number
        )));
        doc.push(elements::Paragraph::new(format!(
            "Date: {}",
            intervention.scheduled_date.format("%d/%m/%Y")
        )));

        doc.push(elements::Break::new(1.5));

        // --- CORPS ---
        if let Some(summary) = &report.summary {
            doc.push(
                elements::Paragraph::new("Résumé")
                    .styled(style::Style::new().bold().with_font_size(13)),
            );
            doc.push(elements::Paragraph::new(summary.clone()));
            doc.push(elements::Break::new(1));
        }

        // Seções dinâmicas do conteúdo
        if let Value::Object(content) = &report.content {
            for (key, value) in content {
                let text = match value {
                    Value::String(s) if s.is_empty() => continue,
                    Value::String(s) => s.clone(),
                    Value::Null => continue,
                    other => other.to_string(),
                };

                doc.push(
                    elements::Paragraph::new(key.clone())
                        .styled(style::Style::new().bold().with_font_size(12)),
                );
                doc.push(elements::Paragraph::new(text));
                doc.push(elements::Break::new(1));
            }
        }

        if let Some(recommendations) = &report.recommendations {
            doc.push(
                elements::Paragraph::new("Recommandations")
                    .styled(style::Style::new().bold().with_font_size(13)),
            );
            doc.push(elements::Paragraph::new(recommendations.clone()));
            doc.push(elements::Break::new(1));
        }

        if let Some(next_steps) = &report.next_steps {
            doc.push(
                elements::Paragraph::new("Prochaines étapes")
                    .styled(style::Style::new().bold().with_font_size(13)),
            );
            doc.push(elements::Paragraph::new(next_steps.clone()));
            doc.push(elements::Break::new(1));
        }

        // --- QR CODE DE VÉRIFICATION ---
        // O código carrega a referência do rapport para conferência rápida
        let verification = format!("report:{}:{}", intervention.reference, report.id);

        let code = QrCode::new(verification.as_bytes())
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

        let image_buffer = code.render::<Luma<u8>>().build();
        let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

        let pdf_image = genpdf::elements::Image::from_dynamic_image(dynamic_image)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?
            .with_scale(genpdf::Scale::new(0.5, 0.5));

        doc.push(elements::Break::new(1));
        doc.push(pdf_image);

        // --- RODAPÉ ---
        doc.push(elements::Break::new(1));
        doc.push(
            elements::Paragraph::new(format!("Référence: {}", verification))
                .styled(style::Style::new().italic().with_font_size(8)),
        );

        // 3. Renderiza para buffer (memória)
        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

        Ok(buffer)
    }
}
