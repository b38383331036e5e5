//! Deterministic, keyword-driven page generator.
//!
//! Used when no AI backend is configured or the tool call fails. The page
//! content is a pure function of the prompt; only ids come from the injected
//! [`IdGenerator`]. Every generated schema validates and has exactly one edge
//! into `preview`.
//!
//! Layout: `section > column > [template content] [image] [cards] [form] [cta]`.

use crate::id::{IdGenerator, NodeId};
use crate::model::{ComponentNode, ComponentType, Edge, PageSchema, Position};
use crate::normalize::GridLayout;
use regex::Regex;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::LazyLock;

// ─── Prompt analysis ─────────────────────────────────────────────────────

/// Page template picked from the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Profile,
    Blog,
    Pricing,
    Contact,
    Landing,
    Portfolio,
    Testimonial,
    Generic,
}

/// Language of the generated copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Indonesian,
}

/// Optional blocks requested by the prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accessories {
    pub hero: bool,
    pub cta: bool,
    pub image: bool,
    pub cards: bool,
    pub form: bool,
}

/// Everything the generator reads from a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptIntent {
    pub category: Category,
    pub language: Language,
    pub accessories: Accessories,
}

#[derive(Clone, Copy)]
enum Accessory {
    Hero,
    Cta,
    Image,
    Cards,
    Form,
}

/// Checked in order; the first match wins.
static CATEGORY_RULES: LazyLock<Vec<(Category, Regex)>> = LazyLock::new(|| {
    compile(&[
        (
            Category::Profile,
            r"\b(profile|profil|about me|about us|tentang saya|tentang kami|biodata|bio|resume|cv)\b",
        ),
        (Category::Blog, r"\b(blog|articles?|artikel|posts?|berita|news)\b"),
        (
            Category::Pricing,
            r"\b(pricing|prices?|harga|paket|plans?|subscriptions?|langganan)\b",
        ),
        (Category::Contact, r"\b(contact|kontak|hubungi)\b"),
        (
            Category::Landing,
            r"\b(landing|homepage|home page|beranda|startup|saas|produk|product)\b",
        ),
        (
            Category::Portfolio,
            r"\b(portfolio|portofolio|karya|projects?|proyek|showcase)\b",
        ),
        (
            Category::Testimonial,
            r"\b(testimonials?|testimoni|reviews?|ulasan)\b",
        ),
    ])
});

static ACCESSORY_RULES: LazyLock<Vec<(Accessory, Regex)>> = LazyLock::new(|| {
    compile(&[
        (Accessory::Hero, r"\b(hero|headline|banner|judul besar)\b"),
        (
            Accessory::Cta,
            r"\b(cta|call to action|call-to-action|buttons?|tombol|sign ?up|daftar|get started)\b",
        ),
        (
            Accessory::Image,
            r"\b(images?|photos?|pictures?|foto|gambar|gallery|galeri)\b",
        ),
        (Accessory::Cards, r"\b(cards?|kartu|grid|features?|fitur)\b"),
        (Accessory::Form, r"\b(form|formulir|newsletter|subscribe)\b"),
    ])
});

static LANGUAGE_RULES: LazyLock<Vec<(Language, Regex)>> = LazyLock::new(|| {
    compile(&[(
        Language::Indonesian,
        r"\b(buat|buatkan|halaman|dengan|untuk|dan|yang|saya|kami|sebuah|tolong)\b",
    )])
});

/// Compile a static rule table. A pattern that fails to compile is logged
/// and left out rather than taking the generator down.
fn compile<T: Copy>(rules: &[(T, &str)]) -> Vec<(T, Regex)> {
    rules
        .iter()
        .filter_map(|(tag, pattern)| match Regex::new(pattern) {
            Ok(re) => Some((*tag, re)),
            Err(err) => {
                log::error!("fallback rule `{pattern}` does not compile: {err}");
                None
            }
        })
        .collect()
}

impl PromptIntent {
    pub fn detect(prompt: &str) -> Self {
        let text = prompt.to_lowercase();
        let category = CATEGORY_RULES
            .iter()
            .find(|(_, re)| re.is_match(&text))
            .map(|(category, _)| *category)
            .unwrap_or(Category::Generic);
        let language = LANGUAGE_RULES
            .iter()
            .find(|(_, re)| re.is_match(&text))
            .map(|(language, _)| *language)
            .unwrap_or(Language::English);
        let mut accessories = Accessories::default();
        for (accessory, re) in ACCESSORY_RULES.iter() {
            if !re.is_match(&text) {
                continue;
            }
            match accessory {
                Accessory::Hero => accessories.hero = true,
                Accessory::Cta => accessories.cta = true,
                Accessory::Image => accessories.image = true,
                Accessory::Cards => accessories.cards = true,
                Accessory::Form => accessories.form = true,
            }
        }
        Self {
            category,
            language,
            accessories,
        }
    }
}

// ─── Copy ────────────────────────────────────────────────────────────────

struct PageCopy {
    title: &'static str,
    subtitle: &'static str,
    items: [(&'static str, &'static str); 3],
}

fn copy_for(category: Category, language: Language) -> PageCopy {
    use Category::*;
    use Language::*;
    match (category, language) {
        (Profile, English) => PageCopy {
            title: "Hi, I'm Alex",
            subtitle: "Designer and developer building calm, useful products.",
            items: [
                ("Design", "Interfaces people enjoy using."),
                ("Engineering", "Reliable software, shipped often."),
                ("Writing", "Notes on craft and process."),
            ],
        },
        (Profile, Indonesian) => PageCopy {
            title: "Halo, saya Alex",
            subtitle: "Desainer dan developer yang membangun produk yang bermanfaat.",
            items: [
                ("Desain", "Antarmuka yang nyaman digunakan."),
                ("Rekayasa", "Perangkat lunak yang andal."),
                ("Tulisan", "Catatan tentang proses berkarya."),
            ],
        },
        (Blog, English) => PageCopy {
            title: "Latest articles",
            subtitle: "Stories, guides and updates from our team.",
            items: [
                ("Getting started", "A short guide for new readers."),
                ("Behind the scenes", "How we plan every release."),
                ("What's next", "A look at the road ahead."),
            ],
        },
        (Blog, Indonesian) => PageCopy {
            title: "Artikel terbaru",
            subtitle: "Cerita, panduan, dan kabar terbaru dari tim kami.",
            items: [
                ("Mulai dari sini", "Panduan singkat untuk pembaca baru."),
                ("Di balik layar", "Cara kami merencanakan rilis."),
                ("Selanjutnya", "Gambaran rencana ke depan."),
            ],
        },
        (Pricing, English) => PageCopy {
            title: "Simple pricing",
            subtitle: "Pick the plan that fits. Upgrade any time.",
            items: [
                ("Basic", "For individuals getting started."),
                ("Pro", "For growing teams that need more."),
                ("Enterprise", "For organisations at scale."),
            ],
        },
        (Pricing, Indonesian) => PageCopy {
            title: "Harga sederhana",
            subtitle: "Pilih paket yang sesuai. Tingkatkan kapan saja.",
            items: [
                ("Dasar", "Untuk perorangan yang baru mulai."),
                ("Pro", "Untuk tim yang sedang berkembang."),
                ("Perusahaan", "Untuk organisasi berskala besar."),
            ],
        },
        (Contact, English) => PageCopy {
            title: "Get in touch",
            subtitle: "We usually reply within one business day.",
            items: [
                ("Send us a message", "Tell us a little about what you need."),
                ("Email", "hello@example.com"),
                ("Office", "Mon to Fri, 9:00 to 17:00"),
            ],
        },
        (Contact, Indonesian) => PageCopy {
            title: "Hubungi kami",
            subtitle: "Kami biasanya membalas dalam satu hari kerja.",
            items: [
                ("Kirim pesan", "Ceritakan sedikit tentang kebutuhan Anda."),
                ("Email", "halo@example.com"),
                ("Kantor", "Senin sampai Jumat, 09.00 sampai 17.00"),
            ],
        },
        (Landing, English) => PageCopy {
            title: "Build your next page in minutes",
            subtitle: "Compose sections visually and publish when you're ready.",
            items: [
                ("Fast", "Start from a working layout."),
                ("Flexible", "Every block is editable."),
                ("Reliable", "What you see is what ships."),
            ],
        },
        (Landing, Indonesian) => PageCopy {
            title: "Bangun halaman Anda dalam hitungan menit",
            subtitle: "Susun bagian secara visual dan terbitkan saat siap.",
            items: [
                ("Cepat", "Mulai dari tata letak yang siap pakai."),
                ("Fleksibel", "Setiap blok bisa diubah."),
                ("Andal", "Yang Anda lihat, itulah yang terbit."),
            ],
        },
        (Portfolio, English) => PageCopy {
            title: "Selected work",
            subtitle: "A few projects I'm proud of.",
            items: [
                ("Project one", "Brand identity and website."),
                ("Project two", "Mobile app for a local café."),
                ("Project three", "Dashboard for a logistics team."),
            ],
        },
        (Portfolio, Indonesian) => PageCopy {
            title: "Karya pilihan",
            subtitle: "Beberapa proyek yang saya banggakan.",
            items: [
                ("Proyek satu", "Identitas merek dan situs web."),
                ("Proyek dua", "Aplikasi untuk kafe lokal."),
                ("Proyek tiga", "Dasbor untuk tim logistik."),
            ],
        },
        (Testimonial, English) => PageCopy {
            title: "What our customers say",
            subtitle: "Real feedback from people using the product every day.",
            items: [
                ("Rina, designer", "\"It made our launch painless.\""),
                ("Budi, founder", "\"We shipped a week early.\""),
                ("Sam, marketer", "\"Finally, pages I can edit myself.\""),
            ],
        },
        (Testimonial, Indonesian) => PageCopy {
            title: "Kata pelanggan kami",
            subtitle: "Masukan nyata dari pengguna setiap hari.",
            items: [
                ("Rina, desainer", "\"Peluncuran kami jadi mudah.\""),
                ("Budi, pendiri", "\"Kami rilis seminggu lebih cepat.\""),
                ("Sam, pemasar", "\"Akhirnya bisa mengubah halaman sendiri.\""),
            ],
        },
        (Generic, English) => PageCopy {
            title: "Welcome",
            subtitle: "A fresh page, ready for your content.",
            items: [
                ("First", "Describe your first point here."),
                ("Second", "Describe your second point here."),
                ("Third", "Describe your third point here."),
            ],
        },
        (Generic, Indonesian) => PageCopy {
            title: "Selamat datang",
            subtitle: "Halaman baru, siap untuk konten Anda.",
            items: [
                ("Pertama", "Tuliskan poin pertama di sini."),
                ("Kedua", "Tuliskan poin kedua di sini."),
                ("Ketiga", "Tuliskan poin ketiga di sini."),
            ],
        },
    }
}

struct Phrases {
    cta: &'static str,
    submit: &'static str,
    image_alt: &'static str,
    avatar_alt: &'static str,
    form_title: &'static str,
    form_description: &'static str,
    badge: &'static str,
}

fn phrases(language: Language) -> Phrases {
    match language {
        Language::English => Phrases {
            cta: "Get started",
            submit: "Send",
            image_alt: "Page illustration",
            avatar_alt: "Profile photo",
            form_title: "Send us a message",
            form_description: "Leave your name and email and we'll get back to you.",
            badge: "New",
        },
        Language::Indonesian => Phrases {
            cta: "Mulai sekarang",
            submit: "Kirim",
            image_alt: "Ilustrasi halaman",
            avatar_alt: "Foto profil",
            form_title: "Kirim pesan",
            form_description: "Tinggalkan nama dan email, kami akan menghubungi Anda.",
            badge: "Baru",
        },
    }
}

// ─── Builder ─────────────────────────────────────────────────────────────

const CHILD_DX: f64 = 240.0;
const CHILD_DY: f64 = 120.0;

/// Appends nodes under a parent, giving each new sibling a strictly larger x
/// than the previous one so that sibling order equals insertion order.
struct PageBuilder<'a> {
    ids: &'a mut dyn IdGenerator,
    nodes: Vec<ComponentNode>,
    edges: Vec<Edge>,
    positions: HashMap<NodeId, Position>,
    slots: HashMap<NodeId, usize>,
}

impl<'a> PageBuilder<'a> {
    fn new(ids: &'a mut dyn IdGenerator) -> Self {
        Self {
            ids,
            nodes: Vec::new(),
            edges: Vec::new(),
            positions: HashMap::new(),
            slots: HashMap::new(),
        }
    }

    fn root(&mut self, component: ComponentType, label: &str, props: Value) -> NodeId {
        let id = self.push(component, label, props, GridLayout::position(0));
        let edge = Edge::to_preview(self.ids.next_id("edge"), id);
        self.edges.push(edge);
        id
    }

    fn child(&mut self, parent: NodeId, component: ComponentType, label: &str, props: Value) -> NodeId {
        let origin = self.positions.get(&parent).copied().unwrap_or_default();
        let slot = self.slots.entry(parent).or_insert(0);
        let position = Position::new(origin.x + *slot as f64 * CHILD_DX, origin.y + CHILD_DY);
        *slot += 1;
        let id = self.push(component, label, props, position);
        let edge = Edge::new(self.ids.next_id("edge"), id, parent);
        self.edges.push(edge);
        id
    }

    fn push(&mut self, component: ComponentType, label: &str, props: Value, position: Position) -> NodeId {
        let id = self.ids.next_id(component.as_str());
        let mut node = ComponentNode::new(id, component, position).with_label(label);
        if let Value::Object(map) = props {
            node.props = map;
        }
        self.positions.insert(id, position);
        self.nodes.push(node);
        id
    }

    fn finish(self, title: &str) -> PageSchema {
        PageSchema {
            title: Some(title.to_string()),
            nodes: self.nodes,
            edges: self.edges,
        }
    }
}

// ─── Generation ──────────────────────────────────────────────────────────

/// Generate a complete page for `prompt`.
pub fn generate(prompt: &str, ids: &mut dyn IdGenerator) -> PageSchema {
    let intent = PromptIntent::detect(prompt);
    log::debug!("fallback generator: {intent:?}");
    generate_for(intent, ids)
}

/// Generate a page for an already-detected intent.
pub fn generate_for(intent: PromptIntent, ids: &mut dyn IdGenerator) -> PageSchema {
    let copy = copy_for(intent.category, intent.language);
    let words = phrases(intent.language);
    let extras = intent.accessories;
    let mut page = PageBuilder::new(ids);

    let section = page.root(
        ComponentType::Section,
        "Section",
        json!({"align": "center", "padding": "64px", "maxWidth": "960px"}),
    );
    let column = page.child(
        section,
        ComponentType::Column,
        "Column",
        json!({"gap": "24px", "align": "center"}),
    );

    // Template content.
    let mut has_image = false;
    let mut has_cards = false;
    let mut has_form = false;
    match intent.category {
        Category::Profile => {
            page.child(
                column,
                ComponentType::Avatar,
                "Avatar",
                json!({"src": "https://placehold.co/160x160", "alt": words.avatar_alt, "size": 96}),
            );
            has_image = true;
        }
        Category::Landing => {
            page.child(
                column,
                ComponentType::Badge,
                "Badge",
                json!({"text": words.badge, "variant": "secondary"}),
            );
        }
        _ => {}
    }

    let (tag, font_size) = if extras.hero { ("h1", "3rem") } else { ("h2", "2rem") };
    page.child(
        column,
        ComponentType::Text,
        "Title",
        json!({"tag": tag, "content": copy.title, "fontSize": font_size, "weight": "700", "align": "center"}),
    );
    page.child(
        column,
        ComponentType::Text,
        "Subtitle",
        json!({"tag": "p", "content": copy.subtitle, "color": "#6b7280", "align": "center"}),
    );

    match intent.category {
        Category::Blog | Category::Pricing | Category::Portfolio | Category::Testimonial => {
            card_row(&mut page, column, &copy.items);
            has_cards = true;
        }
        Category::Contact => {
            form_card(&mut page, column, copy.items[0], words.submit);
            has_form = true;
        }
        _ => {}
    }

    // Accessories.
    if extras.image && !has_image {
        page.child(
            column,
            ComponentType::Image,
            "Image",
            json!({"src": "https://placehold.co/800x400", "alt": words.image_alt, "width": "100%", "rounded": true}),
        );
    }
    if extras.cards && !has_cards {
        card_row(&mut page, column, &copy.items);
    }
    if extras.form && !has_form {
        form_card(&mut page, column, (words.form_title, words.form_description), words.submit);
    }
    if extras.cta {
        page.child(
            column,
            ComponentType::Button,
            "CTA",
            json!({"label": words.cta, "href": "#", "size": "lg", "rounded": true}),
        );
    }

    page.finish(copy.title)
}

fn card_row(page: &mut PageBuilder<'_>, parent: NodeId, items: &[(&str, &str); 3]) {
    let row = page.child(
        parent,
        ComponentType::Row,
        "Cards",
        json!({"gap": "16px", "justify": "center"}),
    );
    for (i, (title, description)) in items.iter().enumerate() {
        page.child(
            row,
            ComponentType::Card,
            &format!("Card {}", i + 1),
            json!({"title": title, "description": description, "padding": "24px"}),
        );
    }
}

fn form_card(page: &mut PageBuilder<'_>, parent: NodeId, (title, description): (&str, &str), submit: &str) {
    let card = page.child(
        parent,
        ComponentType::Card,
        "Form",
        json!({"title": title, "description": description, "padding": "24px"}),
    );
    page.child(
        card,
        ComponentType::Button,
        "Submit",
        json!({"label": submit, "size": "md"}),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SequentialIdGenerator;
    use crate::roots::resolve_roots;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn run(prompt: &str) -> PageSchema {
        generate(prompt, &mut SequentialIdGenerator::new())
    }

    fn node_of_type(schema: &PageSchema, component: ComponentType) -> Option<&ComponentNode> {
        schema.nodes.iter().find(|n| n.component == component)
    }

    fn parent_of(schema: &PageSchema, child: NodeId) -> Option<NodeId> {
        schema
            .edges
            .iter()
            .find(|e| e.child_of() == child)
            .map(Edge::parent_of)
    }

    #[rstest]
    #[case("Buat halaman profil dengan foto dan CTA", Category::Profile)]
    #[case("About me page for a photographer", Category::Profile)]
    #[case("a blog with recent posts", Category::Blog)]
    #[case("Pricing table with three plans", Category::Pricing)]
    #[case("contact page", Category::Contact)]
    #[case("Landing page for a SaaS startup", Category::Landing)]
    #[case("my design portfolio", Category::Portfolio)]
    #[case("customer testimonials", Category::Testimonial)]
    #[case("something nice", Category::Generic)]
    #[case("", Category::Generic)]
    fn detects_category(#[case] prompt: &str, #[case] expected: Category) {
        assert_eq!(PromptIntent::detect(prompt).category, expected);
    }

    #[test]
    fn earlier_categories_take_precedence() {
        // Both "profile" and "blog" match; profile is checked first.
        assert_eq!(PromptIntent::detect("profile with a blog").category, Category::Profile);
    }

    #[rstest]
    #[case("Buat halaman profil", Language::Indonesian)]
    #[case("halaman harga untuk startup", Language::Indonesian)]
    #[case("Make a pricing page", Language::English)]
    fn detects_language(#[case] prompt: &str, #[case] expected: Language) {
        assert_eq!(PromptIntent::detect(prompt).language, expected);
    }

    #[test]
    fn detects_accessories() {
        let extras = PromptIntent::detect("hero banner with a photo, feature grid, newsletter form and a signup button").accessories;
        assert_eq!(
            extras,
            Accessories {
                hero: true,
                cta: true,
                image: true,
                cards: true,
                form: true,
            }
        );
    }

    #[test]
    fn indonesian_profile_with_photo_and_cta() {
        let schema = run("Buat halaman profil dengan foto dan CTA");
        schema.validate().unwrap();

        let section = node_of_type(&schema, ComponentType::Section).unwrap().id;
        let column = node_of_type(&schema, ComponentType::Column).unwrap().id;
        let avatar = node_of_type(&schema, ComponentType::Avatar).unwrap().id;
        let button = node_of_type(&schema, ComponentType::Button).unwrap().id;
        let texts: Vec<NodeId> = schema
            .nodes
            .iter()
            .filter(|n| n.component == ComponentType::Text)
            .map(|n| n.id)
            .collect();
        assert_eq!(texts.len(), 2);
        assert!(node_of_type(&schema, ComponentType::Image).is_none());

        for child in [avatar, texts[0], texts[1], button] {
            assert_eq!(parent_of(&schema, child), Some(column));
        }
        assert_eq!(parent_of(&schema, column), Some(section));
        assert_eq!(parent_of(&schema, section), Some(NodeId::preview()));
        assert_eq!(schema.edges.len(), 6);

        let title = schema.node(texts[0]).unwrap();
        assert_eq!(title.props["content"], "Halo, saya Alex");
    }

    #[rstest]
    #[case("")]
    #[case("profile")]
    #[case("blog with hero image and cards")]
    #[case("pricing, contact form, call to action")]
    #[case("landing page with everything: hero, cta, image, grid, form")]
    #[case("portofolio karya saya dengan galeri")]
    #[case("testimonials")]
    #[case("🚀🚀🚀")]
    fn always_valid_with_one_preview_edge(#[case] prompt: &str) {
        let schema = run(prompt);
        schema.validate().unwrap();
        assert_eq!(schema.edges.iter().filter(|e| e.targets_preview()).count(), 1);
        assert_eq!(resolve_roots(&schema.nodes, &schema.edges).len(), 1);
    }

    #[test]
    fn content_is_independent_of_ids() {
        let a = generate("pricing page with cta", &mut SequentialIdGenerator::new());
        let mut clock = crate::id::ClockIdGenerator::with_timestamp(42);
        let b = generate("pricing page with cta", &mut clock);
        let shape = |s: &PageSchema| -> Vec<(String, String, Position, Value)> {
            s.nodes
                .iter()
                .map(|n| {
                    (
                        n.component.to_string(),
                        n.label.clone(),
                        n.position,
                        Value::Object(n.props.clone()),
                    )
                })
                .collect()
        };
        assert_eq!(shape(&a), shape(&b));
        assert_ne!(a.nodes[0].id, b.nodes[0].id);
    }

    #[test]
    fn siblings_have_strictly_increasing_x() {
        let schema = run("landing page with hero, image, cards, form and cta");
        let column = node_of_type(&schema, ComponentType::Column).unwrap().id;
        let xs: Vec<f64> = schema
            .edges
            .iter()
            .filter(|e| e.parent_of() == column)
            .filter_map(|e| schema.node(e.child_of()))
            .map(|n| n.position.x)
            .collect();
        assert!(xs.len() >= 6);
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn hero_promotes_title_to_h1() {
        let plain = run("blog");
        let hero = run("blog with hero");
        let title = |s: &PageSchema| {
            s.nodes
                .iter()
                .find(|n| n.label == "Title")
                .map(|n| n.props["tag"].clone())
        };
        assert_eq!(title(&plain), Some(json!("h2")));
        assert_eq!(title(&hero), Some(json!("h1")));
    }

    #[test]
    fn templates_with_cards_do_not_duplicate_them() {
        let schema = run("pricing cards");
        let rows = schema.nodes.iter().filter(|n| n.component == ComponentType::Row).count();
        assert_eq!(rows, 1);
    }
}
