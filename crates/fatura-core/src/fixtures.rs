//! Shared test inputs.

use lopdf::{dictionary, Document, Object, Stream};

/// Text layer of a typical distributed-generation invoice.
pub const SAMPLE_INVOICE: &str = "EQUATORIAL ENERGIA
CNPJ/CPF: 123.456.789-09
Tensão Nominal Disp: 220 V
MARIA DA SILVA SOUZA
RUA DAS FLORES 123
CENTRO CEP: 65000-000 SAO LUIS MA BRASIL
Consulte pela Chave de Acesso em: 3012345678
LEITURA ANTERIOR ATUAL DIAS
10/01/2025 09/02/2025 30
CFOP 5258: VENDA DE ENERGIA ELETRICA
JAN/2025 20/02/2025
TOTAL A PAGAR R$***327,84
ITENS DA FATURA
CONSUMO KWH 350,00 0,951234 332,93
CONSUMO SCEE KWH 300,00 0,812345 243,70
INJEÇÃO SCEE - UC 3012345678 KWH 280,00 0,512345 -143,45
PARC INJET S/DESC KWH 280,00 0,512345 0,123456
CONSUMO NÃO COMPENSADO KWH 50,00 0,912345 45,62
ADC BANDEIRA AMARELA KWH 350,00 0,018850 6,60
CONTRIB. ILUM. PÚBLICA - MUNICIPAL 30,00
SALDO KWH: 1.250,00,
GERAÇÃO CICLO (12/2024) KWH: UC 3009876543 : 1.520,35,
";

/// One blank page whose only content is a 2x2 grayscale image, with the
/// resources inherited from the page tree root.
pub fn scanned_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 2,
            "Height" => 2,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8
        },
        vec![0, 255, 255, 0],
    ));
    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! { "Im1" => image_id }
    });
    let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()]
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()]
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}
