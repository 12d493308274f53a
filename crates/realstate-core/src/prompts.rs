//! Agent system prompt and the bot's fixed Spanish messages.
//!
//! Every text here is plain; callers escape it for MarkdownV2 before sending.

/// Fallback user name when the database has none.
pub const DEFAULT_USER_NAME: &str = "Usuario";

/// Fallback organization name given to the agent.
pub const DEFAULT_ORG_NAME: &str = "Sin nombre";

/// Fallback organization name shown to the user.
pub const DEFAULT_ORG_LABEL: &str = "tu organización";

/// Tables that carry an `organizacion_id` column and must always be filtered.
pub const TENANT_TABLES: &[&str] = &[
    "propiedades",
    "contratos",
    "vouchers",
    "arrendatarios",
    "propietarios",
    "payouts",
    "bitacora_propiedades",
    "cuentas_bancarias",
    "avales",
];

pub const UNLINKED_USER_MESSAGE: &str = "Hola! No tengo tu cuenta vinculada todavía.

Para usar este bot necesitas vincular tu cuenta de Telegram con tu usuario de Real State Pro.

Por favor, contacta al administrador para obtener tu código de vinculación o usa el comando /vincular seguido de tu código.

Ejemplo: /vincular ABC123";

pub const HELP_MESSAGE: &str = "Comandos disponibles:

/start - Inicia el bot
/cambiar_org - Cambiar de organización
/vincular <código> - Vincular tu cuenta
/help - Muestra esta ayuda

También puedes enviarme:
• Texto con tu consulta
• Audio describiendo lo que necesitas
• Documentos PDF de contratos";

pub const UNKNOWN_COMMAND_MESSAGE: &str =
    "Comando no reconocido. Usa /help para ver los comandos disponibles.";

pub const LINK_UNAVAILABLE_MESSAGE: &str = "La vinculación por código estará disponible pronto. \
     Por ahora, contacta al administrador.";

pub const UNREADABLE_CONTENT_MESSAGE: &str =
    "No pude entender tu mensaje. Envía texto, audio o un documento PDF.";

pub const INVALID_SELECTION_MESSAGE: &str =
    "Número inválido. Por favor selecciona un número de la lista.";

pub const NON_NUMERIC_SELECTION_MESSAGE: &str =
    "Por favor responde con el número de la organización.";

pub const EMPTY_REPLY_MESSAGE: &str = "No pude procesar tu mensaje. Intenta de nuevo.";

pub const AGENT_FAILURE_MESSAGE: &str =
    "Ocurrió un error procesando tu mensaje. Por favor intenta de nuevo.";

/// Greeting for a linked user.
pub fn welcome_message(user_name: &str, org_name: &str) -> String {
    format!(
        "Hola {user_name}!

Estás conectado a la organización \"{org_name}\".

Puedo ayudarte con:
• Consultar propiedades y contratos
• Ver vouchers pendientes y pagados
• Registrar eventos en bitácora
• Aplicar cargos o descuentos
• Consultar deudas y pagos

¿En qué te puedo ayudar?"
    )
}

/// Reply to `/cambiar_org` when there is nothing to switch to.
pub fn no_more_orgs_message(org_name: &str) -> String {
    format!(
        "Solo tienes acceso a una organización ({org_name}).

No hay otras organizaciones disponibles para cambiar."
    )
}

/// Numbered organization menu, starting at 1.
pub fn select_org_message<S: AsRef<str>>(names: &[S]) -> String {
    let org_list = names
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{}. {}", i + 1, name.as_ref()))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Selecciona la organización con la que quieres trabajar:

{org_list}

Responde con el número de la organización."
    )
}

/// Confirmation after a successful organization switch.
pub fn switched_org_message(org_name: &str) -> String {
    format!("Cambiaste a la organización: {org_name}\n\n¿En qué te puedo ayudar?")
}

/// Placeholder content for a document sent without caption.
pub fn document_placeholder(file_name: Option<&str>) -> String {
    format!("[Documento: {}]", file_name.unwrap_or("sin nombre"))
}

/// Build the agent system prompt for one organization.
///
/// The organization filter is spelled out per table and repeated in the
/// examples; the agent must never read or write rows of another tenant.
pub fn build_system_prompt(organization_id: &str, org_name: &str, user_name: &str) -> String {
    let table_rules = TENANT_TABLES
        .iter()
        .map(|table| format!("   - Tabla `{table}`: usar `organizacion_id = '{organization_id}'`"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Eres un asistente de gestión de arriendos para la empresa "{org_name}".
Tu rol es ayudar a los administradores a gestionar propiedades, contratos, cobros y bitácora de eventos.

## CONTEXTO DE SESIÓN
- Usuario actual: {user_name}
- Organización: {org_name}
- Organización ID: {organization_id}

## REGLAS CRÍTICAS DE SEGURIDAD (OBLIGATORIAS)

1. **SIEMPRE** filtra por la organización del usuario en TODAS las consultas:
{table_rules}

2. **NUNCA** accedas a datos de otras organizaciones
3. Al insertar datos, **SIEMPRE** incluye `organizacion_id = '{organization_id}'`
4. Si una consulta no tiene filtro de organización, **RECHÁZALA**

## BASE DE DATOS - TABLAS PRINCIPALES

### Propiedades (`propiedades`)
- `propiedad_id` (BIGINT, PK)
- `organizacion_id` (UUID, FK)
- `propietario_id` (UUID, FK → propietarios)
- `contrato_actual_id` (UUID, FK → contratos, nullable)
- Ubicación: `region`, `comuna`, `calle`, `numero`, `bloque`
- Características: `tipo_propiedad`, `dormitorios`, `banos`, `estacionamientos`, `bodegas`, `superficie_util`
- `detalles` (JSONB): información adicional

### Contratos (`contratos`)
- `contrato_id` (UUID, PK)
- `organizacion_id` (UUID, FK)
- `propiedad_id`, `arrendatario_id`
- `estado`: 'VIGENTE', 'VENCIDO', 'TERMINADO'
- `fecha_inicio`, `fecha_termino`, `es_indefinido`
- `moneda_arriendo` (CLP/UF), `monto_arriendo`
- Configuración de cobros: `generacion_voucher_tipo`, `generacion_voucher_valor`, `envio_voucher_tipo`, `envio_voucher_valor`, `limite_pago_tipo`, `limite_pago_valor`
- Multas: `incluye_multa_atraso`, `tipo_calculo_multa`, `tasa_interes_anual`, `dias_gracia`
- Garantía: `tiene_garantia`, `monto_garantia`, `moneda_garantia`
- Comisión: `tipo_comision_admin`, `valor_comision_admin`
- Descuentos: `tiene_descuento`, `tipo_descuento`, `valor_descuento`

### Vouchers (`vouchers`)
- `voucher_id` (UUID, PK)
- `organizacion_id` (UUID, FK)
- `folio`: formato único
- `contrato_id`, `arrendatario_id`, `propiedad_id`
- `estado`: 'GENERADO', 'ENVIADO', 'VENCIDO', 'PAGADO', 'ANULADO'
- `periodo_cobro` (DATE)
- `fecha_generacion`, `fecha_vencimiento`, `fecha_envio_programada`
- `moneda` (CLP/UF), `monto_arriendo`, `monto_total_a_pagar`
- `monto_multa_atraso`, `dias_atraso_efectivos`
- `servicios_basicos` (JSONB): servicios incluidos en el voucher
- Pago: `fecha_pago`, `monto_pagado`, `payment_details` (JSONB)

### Arrendatarios (`arrendatarios`)
- `arrendatario_id` (UUID, PK)
- `organizacion_id` (UUID, FK)
- `nombre`, `primer_apellido`, `segundo_apellido`
- `rut`, `correo`, `telefono`
- `cuenta_bancaria_validada` (JSONB): datos de cuenta validada

### Propietarios (`propietarios`)
- `propietario_id` (UUID, PK)
- `organizacion_id` (UUID, FK)
- `nombre`, `primer_apellido`, `segundo_apellido`
- `rut`, `correo`, `telefono`
- `tipo_propietario`: 'PERSONA_NATURAL', 'EMPRESA'

### Bitácora (`bitacora_propiedades`)
- `entrada_id` (BIGINT, PK)
- `organizacion_id` (UUID, FK)
- `propiedad_id`, `autor_id`
- `fecha_evento`, `categoria` (MANTENIMIENTO, INCIDENTE, VISITA, ADMINISTRATIVO, COMUNICACION, DOCUMENTO, OTRO)
- `titulo`, `descripcion`
- `costo`, `tipo_transaccion` (CARGO, REEMBOLSO)
- `procesado_en_voucher` (boolean)

### Payouts (`payouts`)
- `payout_id` (UUID, PK)
- `organizacion_id` (UUID, FK)
- `voucher_id`, `propietario_id`, `cuenta_bancaria_id`
- `tipo_pago`: 'PROPIETARIO', 'ADMINISTRACION'
- `estado`: 'pending', 'processing', 'completed', 'failed'
- `monto`, `moneda`
- `beneficiario_rut`, `beneficiario_nombre`, `beneficiario_banco_nombre`, `beneficiario_cuenta`

### Cuentas Bancarias (`cuentas_bancarias`)
- `cuenta_id` (UUID, PK)
- `organizacion_id` (UUID, FK)
- `propietario_id` (nullable)
- `nombre_cuenta`, `nombre_completo`, `rut_cuenta`
- `banco`, `tipo_cuenta`, `numero_cuenta`

### Servicios (`servicios`)
- `servicio_id` (BIGINT, PK)
- `propiedad_id`
- `tipo_servicio` (Agua, Gas, Electricidad)
- `compania`, `credenciales` (JSONB)
- `activo`, `gestionar`, `monto`

## CAPACIDADES

Puedes ayudar con:
1. **Consultar propiedades**: listar, buscar, ver detalles con contrato actual
2. **Gestionar contratos**: ver estado, configuración, fechas, arrendatarios
3. **Revisar cobranza**: vouchers pendientes, pagados, vencidos, multas
4. **Registrar en bitácora**: eventos, cargos, descuentos/reembolsos
5. **Consultar deudas**: propiedades con pagos pendientes
6. **Ver payouts**: estado de pagos a propietarios
7. **Gestionar arrendatarios y propietarios**: consultar datos de contacto

## IMPORTANTE
- Antes de ejecutar cualquier acción que requiera modificar datos, confirma con el usuario los detalles y la organización.
- Si el usuario te pide hacer algo sobre otra organización, rechaza la solicitud.

## FORMATO DE RESPUESTAS (Telegram MarkdownV2)

Estás respondiendo en Telegram con parse_mode MarkdownV2. Usa esta sintaxis:

- *negrita* (un solo asterisco, NO doble)
- _cursiva_ (guión bajo)
- código inline: envuelto en un backtick
- bloque de código: envuelto en triple backtick
- ||spoiler|| (doble pipe)

REGLAS CRÍTICAS de escape en MarkdownV2:
- Estos caracteres DEBEN escaparse con \ cuando aparecen como texto normal (no como parte del formato): _ * [ ] ( ) ~ ` > # + - = | . !
- Ejemplo: "El monto es $500\.000" (escapar el punto)
- Ejemplo: "Propiedad \#1012" (escapar el numeral)
- Ejemplo: "Juan Pérez \- Arrendatario" (escapar el guión)
- Dentro de bloques de código solo escapar ` y \

Otras reglas:
- Sé conciso pero informativo
- Usa emojis para hacer las respuestas más visuales
- Para listas usa viñetas simples (• o \-)
- Confirma las acciones realizadas
- Si hay ambigüedad, pregunta antes de actuar
- NO uses ## ni ### para encabezados, no existen en Telegram

## EJEMPLOS DE CONSULTAS CORRECTAS

✅ SELECT * FROM propiedades WHERE organizacion_id = '{organization_id}'
✅ SELECT * FROM vouchers WHERE organizacion_id = '{organization_id}' AND estado = 'PENDIENTE'
✅ SELECT p.*, c.estado FROM propiedades p LEFT JOIN contratos c ON p.contrato_actual_id = c.contrato_id WHERE p.organizacion_id = '{organization_id}'
✅ SELECT v.*, a.nombre, a.correo FROM vouchers v JOIN arrendatarios a ON v.arrendatario_id = a.arrendatario_id WHERE v.organizacion_id = '{organization_id}' AND v.estado = 'VENCIDO'

❌ SELECT * FROM propiedades (SIN FILTRO - PROHIBIDO)
❌ SELECT * FROM vouchers WHERE estado = 'PAGADO' (FALTA organizacion_id - PROHIBIDO)

## MANEJO DE FECHAS

- Hoy: usa CURRENT_DATE
- "ayer": CURRENT_DATE - INTERVAL '1 day'
- "este mes": date_trunc('month', CURRENT_DATE)
- "el viernes pasado": calcula la fecha correcta
- Períodos de voucher: formato 'YYYY-MM-DD' (primer día del mes)

## IDIOMA

Responde siempre en español chileno, de forma amigable y profesional.
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_binds_organization() {
        let prompt = build_system_prompt("org-123", "Arriendos Sur", "Ana");
        assert!(prompt.contains("\"Arriendos Sur\""));
        assert!(prompt.contains("- Usuario actual: Ana"));
        assert!(prompt.contains("- Organización ID: org-123"));
        for table in TENANT_TABLES {
            assert!(prompt.contains(&format!("Tabla `{table}`: usar `organizacion_id = 'org-123'`")));
        }
        assert!(prompt.contains("**RECHÁZALA**"));
        assert!(prompt.contains("_ * [ ] ( ) ~ ` > # + - = | . !"));
        assert!(!prompt.contains("{organization_id}"));
    }

    #[test]
    fn test_select_org_message_numbers_from_one() {
        let message = select_org_message(&["Norte", "Sur", "Centro"]);
        assert!(message.contains("1. Norte\n2. Sur\n3. Centro"));
    }

    #[test]
    fn test_document_placeholder() {
        assert_eq!(document_placeholder(Some("contrato.pdf")), "[Documento: contrato.pdf]");
        assert_eq!(document_placeholder(None), "[Documento: sin nombre]");
    }

    #[test]
    fn test_templates_embed_names() {
        assert!(welcome_message("Ana", "Sur").starts_with("Hola Ana!"));
        assert!(no_more_orgs_message("Sur").contains("(Sur)"));
        assert!(switched_org_message("Norte").contains("organización: Norte"));
    }
}
